//! Store session lifecycle.
//!
//! # Responsibility
//! - Load credentials and open the store connection once per process.
//! - Hand out store-backed services that borrow the session's connection.
//!
//! # Invariants
//! - Initialization runs exactly once; a failed session never retries.
//! - The failure is logged once, at `start`. Later accessors only return
//!   `SessionError::Disabled`.

use crate::auth::AuthService;
use crate::config::{ConfigError, CredentialSource, StoreCredentials};
use crate::repo::garden_repo::DocumentGardenRepository;
use crate::service::garden_service::GardenService;
use crate::store::{open_store, open_store_in_memory, SqliteDocumentStore, StoreError};
use log::{error, info};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Garden service bound to a session's store.
pub type SessionGardenService<'s> =
    GardenService<DocumentGardenRepository<SqliteDocumentStore<'s>>>;

/// Reason a session could not start.
#[derive(Debug)]
pub enum SessionInitError {
    Config(ConfigError),
    Store(StoreError),
}

impl Display for SessionInitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "cannot open store: {err}"),
        }
    }
}

impl Error for SessionInitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

/// Returned by every accessor of a session that failed to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    Disabled(String),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disabled(reason) => write!(f, "store unavailable for this session: {reason}"),
        }
    }
}

impl Error for SessionError {}

enum SessionState {
    Ready {
        credentials: StoreCredentials,
        conn: Connection,
    },
    Disabled(SessionInitError),
}

/// Explicitly constructed store handle shared by every action.
pub struct Session {
    state: SessionState,
}

impl Session {
    /// Loads credentials from `source` and opens the store they name.
    pub fn start(source: &CredentialSource) -> Self {
        let state = match source.load().map_err(SessionInitError::Config) {
            Ok(credentials) => match open_store(credentials.database_path()) {
                Ok(conn) => ready(credentials, conn),
                Err(err) => disabled(SessionInitError::Store(err)),
            },
            Err(err) => disabled(err),
        };
        if matches!(state, SessionState::Ready { .. }) {
            info!(
                "event=session_start module=session status=ok source={}",
                source.describe()
            );
        }
        Self { state }
    }

    /// Opens an in-memory store for the given credentials.
    pub fn in_memory(credentials: StoreCredentials) -> Self {
        let state = match open_store_in_memory() {
            Ok(conn) => ready(credentials, conn),
            Err(err) => disabled(SessionInitError::Store(err)),
        };
        Self { state }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, SessionState::Ready { .. })
    }

    /// Startup failure, if any.
    pub fn init_error(&self) -> Option<&SessionInitError> {
        match &self.state {
            SessionState::Disabled(err) => Some(err),
            SessionState::Ready { .. } => None,
        }
    }

    pub fn credentials(&self) -> Result<&StoreCredentials, SessionError> {
        match &self.state {
            SessionState::Ready { credentials, .. } => Ok(credentials),
            SessionState::Disabled(err) => Err(SessionError::Disabled(err.to_string())),
        }
    }

    pub fn store(&self) -> Result<SqliteDocumentStore<'_>, SessionError> {
        match &self.state {
            SessionState::Ready { conn, .. } => Ok(SqliteDocumentStore::new(conn)),
            SessionState::Disabled(err) => Err(SessionError::Disabled(err.to_string())),
        }
    }

    pub fn gardens(&self) -> Result<SessionGardenService<'_>, SessionError> {
        let store = self.store()?;
        Ok(GardenService::new(DocumentGardenRepository::new(store)))
    }

    pub fn auth(&self) -> Result<AuthService<SqliteDocumentStore<'_>>, SessionError> {
        Ok(AuthService::new(self.store()?))
    }
}

fn ready(credentials: StoreCredentials, conn: Connection) -> SessionState {
    SessionState::Ready { credentials, conn }
}

fn disabled(err: SessionInitError) -> SessionState {
    error!("event=session_start module=session status=error error={err}");
    SessionState::Disabled(err)
}
