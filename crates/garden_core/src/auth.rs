//! Login gate for garden actions.
//!
//! # Responsibility
//! - Check that a login email belongs to a registered user.
//! - Register users in the `users` collection.
//!
//! # Invariants
//! - Every login failure surfaces as the same `AuthError::LoginFailed`.
//! - Emails are stored and looked up trimmed and lowercased.
//! - Passwords are required to be non-empty but are not verified.

use crate::store::{Document, DocumentStore, StoreError};
use chrono::{DateTime, Utc};
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Collection holding one document per registered user, keyed by email.
pub const USERS_COLLECTION: &str = "users";

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s/]+@[^@\s/]+\.[^@\s/]+$").expect("valid email regex"));

/// Stored user document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub email: String,
    pub registered_at: DateTime<Utc>,
}

/// Identity of a successfully logged-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub email: String,
}

#[derive(Debug)]
pub enum AuthError {
    /// Coarse login failure; unknown user and store errors look the same.
    LoginFailed,
    InvalidEmail(String),
    AlreadyRegistered(String),
    Store(StoreError),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LoginFailed => write!(f, "login failed"),
            Self::InvalidEmail(email) => write!(f, "invalid email `{email}`"),
            Self::AlreadyRegistered(email) => write!(f, "user `{email}` already registered"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

pub struct AuthService<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> AuthService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Logs a user in by email.
    ///
    /// # Errors
    /// - Always `AuthError::LoginFailed`, whatever the underlying cause.
    pub fn login(&self, email: &str, password: &str) -> Result<AuthenticatedUser, AuthError> {
        let email = normalize_email(email);
        if !EMAIL_RE.is_match(&email) || password.is_empty() {
            warn!("event=login module=auth status=error error_code=bad_input");
            return Err(AuthError::LoginFailed);
        }

        match self.store.get(USERS_COLLECTION, &email) {
            Ok(Some(_)) => {
                info!("event=login module=auth status=ok");
                Ok(AuthenticatedUser { email })
            }
            Ok(None) => {
                warn!("event=login module=auth status=error error_code=unknown_user");
                Err(AuthError::LoginFailed)
            }
            Err(err) => {
                warn!("event=login module=auth status=error error_code=store_error error={err}");
                Err(AuthError::LoginFailed)
            }
        }
    }

    /// Registers a new user document.
    pub fn register_user(&self, email: &str) -> Result<UserRecord, AuthError> {
        let email = normalize_email(email);
        if !EMAIL_RE.is_match(&email) {
            return Err(AuthError::InvalidEmail(email));
        }
        if self.store.get(USERS_COLLECTION, &email)?.is_some() {
            return Err(AuthError::AlreadyRegistered(email));
        }

        let record = UserRecord {
            email: email.clone(),
            registered_at: Utc::now(),
        };
        let document = user_document(&record)?;
        self.store.set(USERS_COLLECTION, &email, &document)?;
        info!("event=user_register module=auth status=ok");
        Ok(record)
    }
}

fn user_document(record: &UserRecord) -> Result<Document, StoreError> {
    match serde_json::to_value(record)? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(StoreError::Serialization(serde::ser::Error::custom(format!(
            "user record serialized to non-object value `{other}`"
        )))),
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}
