//! Store credential loading.
//!
//! # Responsibility
//! - Resolve where the credential payload comes from (env blob or file).
//! - Parse and validate the service-account style JSON payload.
//!
//! # Invariants
//! - A non-empty env blob always wins over the credentials file.
//! - Relative `database_path` values in a file are resolved against the
//!   file's directory.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Env var holding the whole credential JSON payload.
pub const CREDENTIALS_ENV_VAR: &str = "GARDEN_CREDENTIALS_JSON";
/// Env var overriding the credential file location.
pub const CREDENTIALS_FILE_ENV_VAR: &str = "GARDEN_CREDENTIALS_FILE";
pub const DEFAULT_CREDENTIALS_FILE: &str = "garden_credentials.json";

const SERVICE_ACCOUNT_TYPE: &str = "service_account";

/// Service-account style credentials for the document store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreCredentials {
    #[serde(rename = "type")]
    pub account_type: String,
    pub project_id: String,
    pub client_email: String,
    /// SQLite file backing the store; `<project_id>.sqlite3` when omitted.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

impl StoreCredentials {
    /// Parses and validates a JSON credential payload.
    pub fn from_json(payload: &str) -> Result<Self, ConfigError> {
        let credentials: Self = serde_json::from_str(payload).map_err(ConfigError::Malformed)?;
        credentials.validate()?;
        Ok(credentials)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.account_type != SERVICE_ACCOUNT_TYPE {
            return Err(ConfigError::InvalidField {
                field: "type",
                message: format!(
                    "expected `{SERVICE_ACCOUNT_TYPE}`, got `{}`",
                    self.account_type
                ),
            });
        }
        if self.project_id.trim().is_empty() {
            return Err(ConfigError::InvalidField {
                field: "project_id",
                message: "cannot be empty".to_string(),
            });
        }
        if !self.client_email.contains('@') {
            return Err(ConfigError::InvalidField {
                field: "client_email",
                message: format!("`{}` is not an email address", self.client_email),
            });
        }
        Ok(())
    }

    /// Returns the store database location.
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.sqlite3", self.project_id.trim())))
    }
}

/// Origin of the credential payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    File(PathBuf),
    /// JSON payload provided as a secret blob.
    Inline(String),
}

impl CredentialSource {
    /// Resolves the source from process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves the source through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(blob) = lookup(CREDENTIALS_ENV_VAR).filter(|blob| !blob.trim().is_empty()) {
            return Self::Inline(blob);
        }
        let path = lookup(CREDENTIALS_FILE_ENV_VAR)
            .filter(|path| !path.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CREDENTIALS_FILE.to_string());
        Self::File(PathBuf::from(path))
    }

    /// Short label for logs; never includes payload content.
    pub fn describe(&self) -> String {
        match self {
            Self::File(path) => format!("file:{}", path.display()),
            Self::Inline(_) => format!("env:{CREDENTIALS_ENV_VAR}"),
        }
    }

    /// Loads and validates the credentials.
    pub fn load(&self) -> Result<StoreCredentials, ConfigError> {
        match self {
            Self::Inline(payload) => StoreCredentials::from_json(payload),
            Self::File(path) => {
                let payload = read_payload(path)?;
                let mut credentials = StoreCredentials::from_json(&payload)?;
                if let (Some(db_path), Some(dir)) = (&credentials.database_path, path.parent()) {
                    if db_path.is_relative() {
                        credentials.database_path = Some(dir.join(db_path));
                    }
                }
                Ok(credentials)
            }
        }
    }
}

fn read_payload(path: &Path) -> Result<String, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(payload) => Ok(payload),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            Err(ConfigError::Missing(path.to_path_buf()))
        }
        Err(err) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: err,
        }),
    }
}

/// Credential loading failure. Fatal for the session.
#[derive(Debug)]
pub enum ConfigError {
    Missing(PathBuf),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Malformed(serde_json::Error),
    InvalidField {
        field: &'static str,
        message: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(path) => write!(
                f,
                "missing store credentials: `{}` not found and `{CREDENTIALS_ENV_VAR}` unset",
                path.display()
            ),
            Self::Io { path, source } => {
                write!(f, "cannot read credentials `{}`: {source}", path.display())
            }
            Self::Malformed(err) => write!(f, "malformed store credentials: {err}"),
            Self::InvalidField { field, message } => {
                write!(f, "invalid credential field `{field}`: {message}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Malformed(err) => Some(err),
            Self::Missing(_) | Self::InvalidField { .. } => None,
        }
    }
}
