//! Keyed document store contracts and the SQLite implementation.
//!
//! # Responsibility
//! - Define the four primitives the gateway needs: list keys, get, set, update.
//! - Keep document bodies as plain JSON object maps.
//!
//! # Invariants
//! - `set` is a full overwrite; fields missing from the new body are gone.
//! - `update` merges top-level fields and requires the document to exist.
//! - A missing document on `get` is `Ok(None)`, never an empty map.

use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;
pub mod schema;
pub mod sqlite;

pub use open::{open_store, open_store_in_memory};
pub use sqlite::SqliteDocumentStore;

/// Plain key/value document body.
pub type Document = Map<String, Value>;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure raised by a document store operation.
#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    /// Store file was written by a newer schema than this build knows.
    UnsupportedSchema { found: u32, supported: u32 },
    /// Partial update targeted a document that does not exist.
    NotFound { collection: String, key: String },
    /// Stored body is not a JSON object.
    InvalidDocument {
        collection: String,
        key: String,
        message: String,
    },
    Serialization(serde_json::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchema { found, supported } => write!(
                f,
                "store schema version {found} is newer than supported {supported}"
            ),
            Self::NotFound { collection, key } => {
                write!(f, "document `{collection}/{key}` does not exist")
            }
            Self::InvalidDocument {
                collection,
                key,
                message,
            } => write!(f, "document `{collection}/{key}` is malformed: {message}"),
            Self::Serialization(err) => write!(f, "document serialization failed: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::UnsupportedSchema { .. }
            | Self::NotFound { .. }
            | Self::InvalidDocument { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Keyed document store holding one JSON object per `(collection, key)`.
pub trait DocumentStore {
    /// Returns every key present in `collection`. Order is store-defined.
    fn list_keys(&self, collection: &str) -> StoreResult<Vec<String>>;
    fn get(&self, collection: &str, key: &str) -> StoreResult<Option<Document>>;
    /// Writes `body` under `key`, replacing any existing document.
    fn set(&self, collection: &str, key: &str, body: &Document) -> StoreResult<()>;
    /// Merges `fields` into the existing document's top level.
    fn update(&self, collection: &str, key: &str, fields: &Document) -> StoreResult<()>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for &S {
    fn list_keys(&self, collection: &str) -> StoreResult<Vec<String>> {
        (**self).list_keys(collection)
    }

    fn get(&self, collection: &str, key: &str) -> StoreResult<Option<Document>> {
        (**self).get(collection, key)
    }

    fn set(&self, collection: &str, key: &str, body: &Document) -> StoreResult<()> {
        (**self).set(collection, key, body)
    }

    fn update(&self, collection: &str, key: &str, fields: &Document) -> StoreResult<()> {
        (**self).update(collection, key, fields)
    }
}
