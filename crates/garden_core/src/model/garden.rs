//! Garden domain model.
//!
//! # Responsibility
//! - Define `Garden` and the embedded `Plant`/`Task`/`Supply` records.
//! - Convert gardens to and from plain JSON document maps.
//! - Validate records before any write reaches the store.
//!
//! # Invariants
//! - `name` is non-empty and usable as a document key.
//! - `size` is finite and strictly positive.
//! - Owners are non-empty and unique within one garden.
//! - Embedded mappings default to empty on creation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Document key of a garden. Same value as `Garden::name`.
pub type GardenId = String;

/// Plant entry owned by one garden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plant {
    pub name: String,
    /// Free-form organism/category, e.g. `vegetable`.
    pub org_type: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub edible: bool,
    #[serde(default)]
    pub planted: Option<NaiveDate>,
}

impl Plant {
    pub fn new(name: impl Into<String>, org_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            org_type: org_type.into(),
            notes: String::new(),
            edible: false,
            planted: None,
        }
    }
}

/// Task entry owned by one garden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub assignee: String,
}

impl Task {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            assignee: String::new(),
        }
    }
}

/// Supply entry owned by one garden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supply {
    pub name: String,
    pub quantity: i64,
    #[serde(default)]
    pub notes: String,
}

impl Supply {
    pub fn new(name: impl Into<String>, quantity: i64) -> Self {
        Self {
            name: name.into(),
            quantity,
            notes: String::new(),
        }
    }
}

/// Root garden record.
///
/// Embedded mappings use `BTreeMap` so documents and exports keep a stable
/// key order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Garden {
    /// Unique identifier and storage key. Immutable once created.
    pub name: String,
    pub location: String,
    /// Area in acres.
    pub size: f64,
    /// Serialized as `YYYY-MM-DD`.
    pub since: NaiveDate,
    pub owners: Vec<String>,
    #[serde(default)]
    pub plants: BTreeMap<String, Plant>,
    #[serde(default)]
    pub tasks: BTreeMap<String, Task>,
    #[serde(default)]
    pub supplies: BTreeMap<String, Supply>,
}

impl Garden {
    /// Creates a garden with empty plant/task/supply mappings.
    pub fn new(
        name: impl Into<String>,
        location: impl Into<String>,
        size: f64,
        since: NaiveDate,
        owners: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            size,
            since,
            owners,
            plants: BTreeMap::new(),
            tasks: BTreeMap::new(),
            supplies: BTreeMap::new(),
        }
    }

    /// Validates record invariants before persistence.
    ///
    /// # Errors
    /// - Returns the first violated invariant as `GardenValidationError`.
    pub fn validate(&self) -> Result<(), GardenValidationError> {
        validate_name(&self.name)?;
        validate_size(self.size)?;
        validate_owners(&self.owners)?;
        validate_record_ids(EmbeddedKind::Plants, self.plants.keys())?;
        validate_record_ids(EmbeddedKind::Tasks, self.tasks.keys())?;
        validate_supplies(&self.supplies)?;
        Ok(())
    }

    /// Serializes this garden into its plain document map.
    pub fn to_document(&self) -> serde_json::Result<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(serde::ser::Error::custom(format!(
                "garden serialized to non-object value `{other}`"
            ))),
        }
    }

    /// Rebuilds a garden from its plain document map.
    ///
    /// Omitted embedded fields fall back to their defaults.
    pub fn from_document(document: Map<String, Value>) -> serde_json::Result<Self> {
        serde_json::from_value(Value::Object(document))
    }
}

/// Selector for one of the three embedded collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmbeddedKind {
    Plants,
    Tasks,
    Supplies,
}

impl EmbeddedKind {
    pub const ALL: [EmbeddedKind; 3] = [Self::Plants, Self::Tasks, Self::Supplies];

    /// Document field name, also used as the default export label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plants => "plants",
            Self::Tasks => "tasks",
            Self::Supplies => "supplies",
        }
    }
}

impl Display for EmbeddedKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmbeddedKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "plants" | "plant" => Ok(Self::Plants),
            "tasks" | "task" => Ok(Self::Tasks),
            "supplies" | "supply" => Ok(Self::Supplies),
            other => Err(format!(
                "unknown collection `{other}`; expected {}",
                Self::ALL.map(Self::as_str).join("|")
            )),
        }
    }
}

/// Validation failure for garden records and partial updates.
#[derive(Debug, Clone, PartialEq)]
pub enum GardenValidationError {
    EmptyName,
    /// Name cannot serve as a document key.
    InvalidName(String),
    InvalidSize(f64),
    EmptyOwners,
    EmptyOwner { index: usize },
    DuplicateOwner(String),
    EmptyRecordId(EmbeddedKind),
    NegativeQuantity { supply_id: String, quantity: i64 },
    EmptyPatch,
}

impl Display for GardenValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "garden name cannot be empty"),
            Self::InvalidName(name) => write!(
                f,
                "garden name `{name}` is not a valid document key (no `/`, not `.` or `..`)"
            ),
            Self::InvalidSize(size) => {
                write!(f, "garden size must be a positive number, got {size}")
            }
            Self::EmptyOwners => write!(f, "garden needs at least one owner"),
            Self::EmptyOwner { index } => {
                write!(f, "owner #{} is empty", index + 1)
            }
            Self::DuplicateOwner(owner) => write!(f, "owner `{owner}` is listed twice"),
            Self::EmptyRecordId(kind) => write!(f, "{kind} entry has an empty identifier"),
            Self::NegativeQuantity {
                supply_id,
                quantity,
            } => write!(
                f,
                "supply `{supply_id}` has negative quantity {quantity}"
            ),
            Self::EmptyPatch => write!(f, "partial update contains no fields"),
        }
    }
}

impl Error for GardenValidationError {}

pub(crate) fn validate_name(name: &str) -> Result<(), GardenValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(GardenValidationError::EmptyName);
    }
    if name.contains('/') || trimmed == "." || trimmed == ".." {
        return Err(GardenValidationError::InvalidName(name.to_string()));
    }
    Ok(())
}

pub(crate) fn validate_size(size: f64) -> Result<(), GardenValidationError> {
    if !size.is_finite() || size <= 0.0 {
        return Err(GardenValidationError::InvalidSize(size));
    }
    Ok(())
}

pub(crate) fn validate_owners(owners: &[String]) -> Result<(), GardenValidationError> {
    if owners.is_empty() {
        return Err(GardenValidationError::EmptyOwners);
    }
    let mut seen = BTreeSet::new();
    for (index, owner) in owners.iter().enumerate() {
        if owner.trim().is_empty() {
            return Err(GardenValidationError::EmptyOwner { index });
        }
        if !seen.insert(owner.as_str()) {
            return Err(GardenValidationError::DuplicateOwner(owner.clone()));
        }
    }
    Ok(())
}

pub(crate) fn validate_record_ids<'a>(
    kind: EmbeddedKind,
    ids: impl IntoIterator<Item = &'a String>,
) -> Result<(), GardenValidationError> {
    if ids.into_iter().any(|id| id.trim().is_empty()) {
        return Err(GardenValidationError::EmptyRecordId(kind));
    }
    Ok(())
}

pub(crate) fn validate_supplies(
    supplies: &BTreeMap<String, Supply>,
) -> Result<(), GardenValidationError> {
    validate_record_ids(EmbeddedKind::Supplies, supplies.keys())?;
    for (supply_id, supply) in supplies {
        if supply.quantity < 0 {
            return Err(GardenValidationError::NegativeQuantity {
                supply_id: supply_id.clone(),
                quantity: supply.quantity,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate_name, EmbeddedKind, Garden, GardenValidationError, Supply};
    use chrono::NaiveDate;

    fn since() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 4, 1).unwrap()
    }

    #[test]
    fn new_garden_starts_with_empty_collections() {
        let garden = Garden::new("Maple St", "12 Maple St", 0.5, since(), vec!["Alice".into()]);
        assert!(garden.plants.is_empty());
        assert!(garden.tasks.is_empty());
        assert!(garden.supplies.is_empty());
        garden.validate().unwrap();
    }

    #[test]
    fn document_serializes_since_as_iso_date() {
        let garden = Garden::new("Maple St", "12 Maple St", 0.5, since(), vec!["Alice".into()]);
        let document = garden.to_document().unwrap();
        assert_eq!(document["since"], "2023-04-01");
        assert_eq!(document["plants"], serde_json::json!({}));
    }

    #[test]
    fn name_with_slash_is_rejected() {
        assert!(matches!(
            validate_name("a/b"),
            Err(GardenValidationError::InvalidName(_))
        ));
        assert!(matches!(
            validate_name("  "),
            Err(GardenValidationError::EmptyName)
        ));
    }

    #[test]
    fn zero_and_nan_sizes_are_rejected() {
        let mut garden = Garden::new("g", "", 0.0, since(), vec!["Alice".into()]);
        assert!(matches!(
            garden.validate(),
            Err(GardenValidationError::InvalidSize(_))
        ));
        garden.size = f64::NAN;
        assert!(garden.validate().is_err());
    }

    #[test]
    fn duplicate_and_blank_owners_are_rejected() {
        let mut garden = Garden::new("g", "", 1.0, since(), vec!["Alice".into(), "Alice".into()]);
        assert_eq!(
            garden.validate(),
            Err(GardenValidationError::DuplicateOwner("Alice".into()))
        );
        garden.owners = vec!["Alice".into(), "".into()];
        assert_eq!(
            garden.validate(),
            Err(GardenValidationError::EmptyOwner { index: 1 })
        );
    }

    #[test]
    fn negative_supply_quantity_is_rejected() {
        let mut garden = Garden::new("g", "", 1.0, since(), vec!["Alice".into()]);
        garden.supplies.insert("s1".into(), Supply::new("Hose", -1));
        assert!(matches!(
            garden.validate(),
            Err(GardenValidationError::NegativeQuantity { quantity: -1, .. })
        ));
    }

    #[test]
    fn embedded_kind_parses_singular_and_plural() {
        assert_eq!("Plants".parse::<EmbeddedKind>(), Ok(EmbeddedKind::Plants));
        assert_eq!("supply".parse::<EmbeddedKind>(), Ok(EmbeddedKind::Supplies));
        let err = "seeds".parse::<EmbeddedKind>().unwrap_err();
        assert!(err.ends_with("expected plants|tasks|supplies"));
    }
}
