//! CSV export of embedded garden collections.
//!
//! # Invariants
//! - One data row per mapping value, in mapping key order.
//! - Columns are the union of record fields in first-seen order.
//! - Booleans render as `True`/`False`; absent values render empty.
//! - An empty mapping exports as an empty file.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Downloadable CSV payload for one embedded collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    /// `<label>.csv`
    pub file_name: String,
    pub contents: String,
    rows: usize,
}

impl CsvExport {
    /// Number of exported records, header excluded.
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Writes the payload as `<dir>/<file_name>` and returns the path.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<PathBuf, ExportError> {
        let path = dir.as_ref().join(&self.file_name);
        std::fs::write(&path, self.contents.as_bytes()).map_err(ExportError::Io)?;
        Ok(path)
    }
}

#[derive(Debug)]
pub enum ExportError {
    InvalidLabel(String),
    /// Mapping value did not serialize to a flat record.
    NotARecord(String),
    Serialization(serde_json::Error),
    Csv(csv::Error),
    Io(std::io::Error),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLabel(label) => write!(f, "invalid export label `{label}`"),
            Self::NotARecord(key) => write!(f, "entry `{key}` is not a record"),
            Self::Serialization(err) => write!(f, "{err}"),
            Self::Csv(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Serialization(err) => Some(err),
            Self::Csv(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::InvalidLabel(_) | Self::NotARecord(_) => None,
        }
    }
}

impl From<csv::Error> for ExportError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

/// Flattens `records` into a CSV file named after `label`.
pub fn export_csv<T: Serialize>(
    records: &BTreeMap<String, T>,
    label: &str,
) -> Result<CsvExport, ExportError> {
    let label = label.trim();
    if label.is_empty() || label.contains(['/', '\\']) {
        return Err(ExportError::InvalidLabel(label.to_string()));
    }

    let mut rows = Vec::with_capacity(records.len());
    let mut columns: Vec<String> = Vec::new();
    for (key, record) in records {
        let Value::Object(fields) =
            serde_json::to_value(record).map_err(ExportError::Serialization)?
        else {
            return Err(ExportError::NotARecord(key.clone()));
        };
        for field in fields.keys() {
            if !columns.iter().any(|column| column == field) {
                columns.push(field.clone());
            }
        }
        rows.push(fields);
    }

    let file_name = format!("{label}.csv");
    if rows.is_empty() {
        return Ok(CsvExport {
            file_name,
            contents: String::new(),
            rows: 0,
        });
    }

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(&columns)?;
    for row in &rows {
        writer.write_record(columns.iter().map(|column| render_cell(row.get(column))))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Io(err.into_error()))?;
    let contents = String::from_utf8(bytes)
        .map_err(|err| ExportError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err)))?;

    Ok(CsvExport {
        file_name,
        contents,
        rows: rows.len(),
    })
}

fn render_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::Bool(true)) => "True".to_string(),
        Some(Value::Bool(false)) => "False".to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        Some(other) => other.to_string(),
    }
}
