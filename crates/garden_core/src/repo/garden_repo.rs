//! Garden persistence gateway.
//!
//! # Responsibility
//! - Expose the four garden operations over a keyed document store.
//! - Translate between `Garden` records and plain documents.
//!
//! # Invariants
//! - Write paths validate before reaching the store.
//! - `get_garden` on an unknown key returns `Ok(None)`.
//! - Read paths reject documents that do not form a valid garden.
//! - Create is a full overwrite; field updates are a top-level merge.

use crate::model::garden::{Garden, GardenId, GardenValidationError};
use crate::model::patch::GardenPatch;
use crate::store::{DocumentStore, StoreError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Collection holding one document per garden.
pub const GARDENS_COLLECTION: &str = "gardens";

pub type RepoResult<T> = Result<T, RepoError>;

/// Gateway error for garden reads and writes.
#[derive(Debug)]
pub enum RepoError {
    Validation(GardenValidationError),
    Store(StoreError),
    /// Partial update targeted a garden with no stored document.
    NotFound(GardenId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::NotFound(name) => write!(f, "garden not found: {name}"),
            Self::InvalidData(message) => write!(f, "invalid stored garden data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<GardenValidationError> for RepoError {
    fn from(value: GardenValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound { key, .. } => Self::NotFound(key),
            other => Self::Store(other),
        }
    }
}

/// Gateway interface for garden persistence.
pub trait GardenRepository {
    fn list_gardens(&self) -> RepoResult<Vec<GardenId>>;
    fn get_garden(&self, id: &str) -> RepoResult<Option<Garden>>;
    fn create_or_replace_garden(&self, garden: &Garden) -> RepoResult<()>;
    fn update_garden_fields(&self, id: &str, patch: &GardenPatch) -> RepoResult<()>;
}

/// Garden gateway backed by any `DocumentStore`.
pub struct DocumentGardenRepository<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> DocumentGardenRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: DocumentStore> GardenRepository for DocumentGardenRepository<S> {
    fn list_gardens(&self) -> RepoResult<Vec<GardenId>> {
        Ok(self.store.list_keys(GARDENS_COLLECTION)?)
    }

    fn get_garden(&self, id: &str) -> RepoResult<Option<Garden>> {
        let Some(document) = self.store.get(GARDENS_COLLECTION, id)? else {
            return Ok(None);
        };

        let garden = Garden::from_document(document).map_err(|err| {
            RepoError::InvalidData(format!("document `{id}` is not a garden: {err}"))
        })?;
        if garden.name != id {
            return Err(RepoError::InvalidData(format!(
                "document `{id}` carries mismatched name `{}`",
                garden.name
            )));
        }
        Ok(Some(garden))
    }

    fn create_or_replace_garden(&self, garden: &Garden) -> RepoResult<()> {
        garden.validate()?;

        let document = garden
            .to_document()
            .map_err(|err| RepoError::Store(StoreError::Serialization(err)))?;
        self.store.set(GARDENS_COLLECTION, &garden.name, &document)?;

        info!("event=garden_write module=repo status=ok mode=overwrite");
        Ok(())
    }

    fn update_garden_fields(&self, id: &str, patch: &GardenPatch) -> RepoResult<()> {
        patch.validate()?;

        let fields = patch
            .to_fields()
            .map_err(|err| RepoError::Store(StoreError::Serialization(err)))?;
        match self.store.update(GARDENS_COLLECTION, id, &fields) {
            Ok(()) => {
                info!(
                    "event=garden_write module=repo status=ok mode=merge fields={}",
                    patch.field_names().join(",")
                );
                Ok(())
            }
            Err(err) => {
                warn!("event=garden_write module=repo status=error mode=merge error={err}");
                Err(err.into())
            }
        }
    }
}
