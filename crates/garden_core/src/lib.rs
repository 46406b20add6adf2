//! Garden tracking core: record schema, document-store gateway and the
//! use cases behind the garden actions (login, create, browse, export).

pub mod auth;
pub mod config;
pub mod export;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod session;
pub mod store;

pub use auth::{AuthError, AuthService, AuthenticatedUser, UserRecord, USERS_COLLECTION};
pub use config::{ConfigError, CredentialSource, StoreCredentials};
pub use export::{export_csv, CsvExport, ExportError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::garden::{
    EmbeddedKind, Garden, GardenId, GardenValidationError, Plant, Supply, Task,
};
pub use model::patch::GardenPatch;
pub use repo::garden_repo::{
    DocumentGardenRepository, GardenRepository, RepoError, RepoResult, GARDENS_COLLECTION,
};
pub use service::garden_service::{
    garden_summary, GardenForm, GardenService, GardenServiceError, GardenView,
};
pub use session::{Session, SessionError, SessionGardenService, SessionInitError};
pub use store::{
    open_store, open_store_in_memory, Document, DocumentStore, SqliteDocumentStore, StoreError,
};

