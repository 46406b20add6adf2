//! Garden use-case service.
//!
//! # Responsibility
//! - Turn raw form input into validated gardens.
//! - Back the create/browse/view/export actions with gateway calls.
//! - Append plants, tasks and supplies to an existing garden.
//!
//! # Invariants
//! - Create always goes through the full-overwrite gateway path.
//! - Field updates and entry appends go through the merge path only.
//! - Entry appends are read-then-merge with last-writer-wins semantics.

use crate::export::{export_csv, CsvExport, ExportError};
use crate::model::garden::{
    EmbeddedKind, Garden, GardenId, GardenValidationError, Plant, Supply, Task,
};
use crate::model::patch::GardenPatch;
use crate::repo::garden_repo::{GardenRepository, RepoError};
use chrono::NaiveDate;
use log::info;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Smallest size the create form accepts.
pub const MIN_FORM_SIZE: f64 = 0.1;

#[derive(Debug)]
pub enum GardenServiceError {
    Validation(GardenValidationError),
    SizeBelowMinimum(f64),
    GardenNotFound(GardenId),
    Repo(RepoError),
    Export(ExportError),
    /// Write succeeded but read-back disagrees.
    InconsistentState(&'static str),
}

impl Display for GardenServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::SizeBelowMinimum(size) => {
                write!(f, "size {size} is below the minimum of {MIN_FORM_SIZE}")
            }
            Self::GardenNotFound(name) => write!(f, "no such garden: {name}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Export(err) => write!(f, "export failed: {err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent garden state: {details}"),
        }
    }
}

impl Error for GardenServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Export(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for GardenServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(name) => Self::GardenNotFound(name),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<GardenValidationError> for GardenServiceError {
    fn from(value: GardenValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ExportError> for GardenServiceError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}

/// Raw create-form input.
#[derive(Debug, Clone, PartialEq)]
pub struct GardenForm {
    pub name: String,
    pub location: String,
    pub size: f64,
    /// Comma-separated owner names.
    pub owners: String,
    pub since: NaiveDate,
}

impl GardenForm {
    /// Builds a validated garden with empty embedded collections.
    pub fn into_garden(self) -> Result<Garden, GardenServiceError> {
        if self.size.is_nan() || self.size < MIN_FORM_SIZE {
            return Err(GardenServiceError::SizeBelowMinimum(self.size));
        }
        let garden = Garden::new(
            self.name.trim(),
            self.location.trim(),
            self.size,
            self.since,
            split_owners(&self.owners),
        );
        garden.validate()?;
        Ok(garden)
    }
}

/// Splits comma-separated owners, trimming each entry.
///
/// Blank entries are kept so validation can point at them.
pub fn split_owners(raw: &str) -> Vec<String> {
    raw.split(',').map(|owner| owner.trim().to_string()).collect()
}

/// One-line garden description.
pub fn garden_summary(garden: &Garden) -> String {
    format!(
        "{} | {} acres | {} | Owners: {}",
        garden.location,
        garden.size,
        garden.since.format("%Y-%m-%d"),
        garden.owners.join(", ")
    )
}

/// Read model for the garden view page.
#[derive(Debug, Clone, PartialEq)]
pub struct GardenView {
    pub summary: String,
    pub garden: Garden,
}

pub struct GardenService<R: GardenRepository> {
    repo: R,
}

impl<R: GardenRepository> GardenService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list_gardens(&self) -> Result<Vec<GardenId>, GardenServiceError> {
        Ok(self.repo.list_gardens()?)
    }

    /// Creates a garden from form input, replacing any garden with that name.
    pub fn create_garden(&self, form: GardenForm) -> Result<Garden, GardenServiceError> {
        let garden = form.into_garden()?;
        self.repo.create_or_replace_garden(&garden)?;
        info!(
            "event=garden_create module=service status=ok owners={}",
            garden.owners.len()
        );
        Ok(garden)
    }

    pub fn get_garden(&self, name: &str) -> Result<Option<Garden>, GardenServiceError> {
        Ok(self.repo.get_garden(name)?)
    }

    pub fn view_garden(&self, name: &str) -> Result<Option<GardenView>, GardenServiceError> {
        Ok(self.repo.get_garden(name)?.map(|garden| GardenView {
            summary: garden_summary(&garden),
            garden,
        }))
    }

    /// Merges `patch` into a stored garden and returns the stored result.
    pub fn update_garden(
        &self,
        name: &str,
        patch: &GardenPatch,
    ) -> Result<Garden, GardenServiceError> {
        self.repo.update_garden_fields(name, patch)?;
        self.repo
            .get_garden(name)?
            .ok_or(GardenServiceError::InconsistentState(
                "updated garden not found in read-back",
            ))
    }

    /// Exports one embedded collection of a stored garden as CSV.
    pub fn export_collection(
        &self,
        name: &str,
        kind: EmbeddedKind,
    ) -> Result<CsvExport, GardenServiceError> {
        let garden = self.require_garden(name)?;
        let export = match kind {
            EmbeddedKind::Plants => export_csv(&garden.plants, kind.as_str())?,
            EmbeddedKind::Tasks => export_csv(&garden.tasks, kind.as_str())?,
            EmbeddedKind::Supplies => export_csv(&garden.supplies, kind.as_str())?,
        };
        info!(
            "event=garden_export module=service status=ok collection={kind} rows={}",
            export.row_count()
        );
        Ok(export)
    }

    /// Adds a plant under a generated identifier and returns that identifier.
    pub fn add_plant(&self, name: &str, plant: Plant) -> Result<String, GardenServiceError> {
        let mut plants = self.require_garden(name)?.plants;
        let id = insert_with_new_id(&mut plants, plant);
        self.repo.update_garden_fields(
            name,
            &GardenPatch {
                plants: Some(plants),
                ..GardenPatch::default()
            },
        )?;
        Ok(id)
    }

    pub fn add_task(&self, name: &str, task: Task) -> Result<String, GardenServiceError> {
        let mut tasks = self.require_garden(name)?.tasks;
        let id = insert_with_new_id(&mut tasks, task);
        self.repo.update_garden_fields(
            name,
            &GardenPatch {
                tasks: Some(tasks),
                ..GardenPatch::default()
            },
        )?;
        Ok(id)
    }

    pub fn add_supply(&self, name: &str, supply: Supply) -> Result<String, GardenServiceError> {
        let mut supplies = self.require_garden(name)?.supplies;
        let id = insert_with_new_id(&mut supplies, supply);
        self.repo
            .update_garden_fields(name, &GardenPatch::supplies(supplies))?;
        Ok(id)
    }

    fn require_garden(&self, name: &str) -> Result<Garden, GardenServiceError> {
        self.repo
            .get_garden(name)?
            .ok_or_else(|| GardenServiceError::GardenNotFound(name.to_string()))
    }
}

fn insert_with_new_id<T>(entries: &mut BTreeMap<String, T>, entry: T) -> String {
    let id = Uuid::new_v4().to_string();
    entries.insert(id.clone(), entry);
    id
}
