//! Typed partial update for stored gardens.
//!
//! # Invariants
//! - `name` is never patchable; it is the document key.
//! - Only fields that are `Some` reach the store.
//! - Embedded mappings are replaced as a whole, not merged entry by entry.

use crate::model::garden::{
    validate_owners, validate_record_ids, validate_size, validate_supplies, EmbeddedKind,
    GardenValidationError, Plant, Supply, Task,
};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Partial update merged into an existing garden document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GardenPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owners: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plants: Option<BTreeMap<String, Plant>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks: Option<BTreeMap<String, Task>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplies: Option<BTreeMap<String, Supply>>,
}

impl GardenPatch {
    pub fn location(location: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            ..Self::default()
        }
    }

    pub fn supplies(supplies: BTreeMap<String, Supply>) -> Self {
        Self {
            supplies: Some(supplies),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Validates the fields carried by this patch.
    pub fn validate(&self) -> Result<(), GardenValidationError> {
        if self.is_empty() {
            return Err(GardenValidationError::EmptyPatch);
        }
        if let Some(size) = self.size {
            validate_size(size)?;
        }
        if let Some(owners) = &self.owners {
            validate_owners(owners)?;
        }
        if let Some(plants) = &self.plants {
            validate_record_ids(EmbeddedKind::Plants, plants.keys())?;
        }
        if let Some(tasks) = &self.tasks {
            validate_record_ids(EmbeddedKind::Tasks, tasks.keys())?;
        }
        if let Some(supplies) = &self.supplies {
            validate_supplies(supplies)?;
        }
        Ok(())
    }

    /// Returns the top-level document fields set by this patch.
    pub fn to_fields(&self) -> serde_json::Result<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(serde::ser::Error::custom(format!(
                "garden patch serialized to non-object value `{other}`"
            ))),
        }
    }

    /// Names of the fields this patch touches, in document order.
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.location.is_some() {
            names.push("location");
        }
        if self.size.is_some() {
            names.push("size");
        }
        if self.since.is_some() {
            names.push("since");
        }
        if self.owners.is_some() {
            names.push("owners");
        }
        if self.plants.is_some() {
            names.push("plants");
        }
        if self.tasks.is_some() {
            names.push("tasks");
        }
        if self.supplies.is_some() {
            names.push("supplies");
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::GardenPatch;
    use crate::model::garden::{GardenValidationError, Supply};
    use std::collections::BTreeMap;

    #[test]
    fn to_fields_only_contains_set_fields() {
        let fields = GardenPatch::location("X").to_fields().unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["location"], "X");
    }

    #[test]
    fn empty_patch_is_rejected() {
        assert_eq!(
            GardenPatch::default().validate(),
            Err(GardenValidationError::EmptyPatch)
        );
    }

    #[test]
    fn supplies_patch_serializes_nested_records() {
        let mut supplies = BTreeMap::new();
        supplies.insert("s1".to_string(), Supply::new("Hose", 2));
        let patch = GardenPatch::supplies(supplies);
        let fields = patch.to_fields().unwrap();
        assert_eq!(
            fields["supplies"],
            serde_json::json!({"s1": {"name": "Hose", "quantity": 2, "notes": ""}})
        );
        assert_eq!(patch.field_names(), vec!["supplies"]);
    }
}
