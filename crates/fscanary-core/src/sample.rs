//! Sample records: one row of the canary log.
//!
//! A [`Schema`] fixes the column order once, up front. A [`SampleRecord`] is a
//! set of slots in that order, so the order collectors happen to fill values
//! never changes the order they are written in.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::ProbeError;

/// Wall-clock capture instant identity field.
pub const TIMESTAMP_FIELD: &str = "@timestamp";
/// Normalized target path identity field.
pub const PATH_FIELD: &str = "path";

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// A single cell of a sample record.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Free text: timestamps and paths.
    Text(String),
    /// Monotonic clock reading in seconds.
    Seconds(f64),
    /// Entry counts and byte sizes.
    Count(u64),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Seconds(s) => write!(f, "{s}"),
            Self::Count(n) => write!(f, "{n}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// Ordered list of field names shared by every record of a probe run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<&'static str>,
}

impl Schema {
    /// Build a schema from field names in column order.
    pub fn new(fields: Vec<&'static str>) -> Self {
        debug_assert!(
            fields
                .iter()
                .enumerate()
                .all(|(i, f)| !fields[..i].contains(f)),
            "duplicate field in schema: {fields:?}"
        );
        Self { fields }
    }

    pub fn fields(&self) -> &[&'static str] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| *f == name)
    }

    /// Comma-joined header line, without trailing newline.
    pub fn header_line(&self) -> String {
        self.fields.join(",")
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// Metric values for one (target directory × probe pass).
#[derive(Debug, Clone)]
pub struct SampleRecord {
    slots: Vec<(&'static str, Option<Value>)>,
}

impl SampleRecord {
    /// Empty record with one unset slot per schema field.
    pub fn new(schema: &Schema) -> Self {
        Self {
            slots: schema.fields().iter().map(|f| (*f, None)).collect(),
        }
    }

    /// Set a field. Fails if the schema does not declare it.
    pub fn set(&mut self, name: &'static str, value: Value) -> Result<(), ProbeError> {
        let slot = self
            .slots
            .iter_mut()
            .find(|(f, _)| *f == name)
            .ok_or(ProbeError::UnknownField(name))?;
        slot.1 = Some(value);
        Ok(())
    }

    pub fn set_seconds(&mut self, name: &'static str, secs: f64) -> Result<(), ProbeError> {
        self.set(name, Value::Seconds(secs))
    }

    pub fn set_count(&mut self, name: &'static str, n: u64) -> Result<(), ProbeError> {
        self.set(name, Value::Count(n))
    }

    pub fn set_text(&mut self, name: &'static str, s: impl Into<String>) -> Result<(), ProbeError> {
        self.set(name, Value::Text(s.into()))
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.slots
            .iter()
            .find(|(f, _)| *f == name)
            .and_then(|(_, v)| v.as_ref())
    }

    /// Field names in column order.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.slots.iter().map(|(f, _)| *f)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(|(_, v)| v.is_some())
    }

    /// Comma-joined header line for this record's fields.
    pub fn header_line(&self) -> String {
        self.field_names().collect::<Vec<_>>().join(",")
    }

    /// Comma-joined display values. Fails on the first unset field.
    ///
    /// Values are not quoted or escaped; a value containing a comma produces a
    /// row with too many columns.
    pub fn row_line(&self) -> Result<String, ProbeError> {
        let mut cells = Vec::with_capacity(self.slots.len());
        for (name, value) in &self.slots {
            let value = value.as_ref().ok_or(ProbeError::IncompleteRecord(*name))?;
            cells.push(value.to_string());
        }
        Ok(cells.join(","))
    }
}

/// Normalize a target path for the `path` field: `/`-separated, with `.`
/// components and trailing separators dropped.
pub fn normalize_path(path: &Path) -> String {
    let normalized: PathBuf = path.components().collect();
    let s = normalized.to_string_lossy();
    if std::path::MAIN_SEPARATOR == '/' {
        s.into_owned()
    } else {
        s.replace(std::path::MAIN_SEPARATOR, "/")
    }
}
