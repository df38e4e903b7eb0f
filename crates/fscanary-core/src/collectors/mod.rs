//! Metric collectors.
//!
//! Each collector measures one filesystem behavior on a target directory and
//! writes its bracketing timestamps and result values into the shared
//! [`SampleRecord`]. Collectors declare their fields up front so the record
//! schema, and therefore the log's column order, is known before any probe runs.

mod aggregate_size;
mod entry_count;
mod round_trip;

use std::path::{Path, PathBuf};

pub use aggregate_size::AggregateSize;
pub use entry_count::EntryCount;
pub use round_trip::{TEMP_FILE_NAME, WriteReadRoundTrip};

use crate::clock::Clock;
use crate::error::ProbeError;
use crate::sample::SampleRecord;

/// Which column layout and collector set a probe uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProbeVariant {
    /// Timestamp, listing, sizing and payload write/read round trip.
    #[default]
    Full,
    /// Listing and sizing only, without the capture timestamp.
    Reduced,
}

impl std::fmt::Display for ProbeVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Reduced => write!(f, "reduced"),
        }
    }
}

impl std::str::FromStr for ProbeVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(Self::Full),
            "reduced" => Ok(Self::Reduced),
            other => Err(format!("unknown probe variant '{other}'")),
        }
    }
}

/// A unit of measurement contributing named fields to a sample record.
pub trait Collector {
    /// Metric base name, e.g. `"glob"`.
    fn name(&self) -> &'static str;

    /// Fields this collector sets, in column order.
    fn fields(&self) -> &'static [&'static str];

    /// Measure `target` and record the results into `sample`.
    ///
    /// Errors are not recovered here; they abort the whole record.
    fn collect(
        &self,
        target: &Path,
        clock: &dyn Clock,
        sample: &mut SampleRecord,
    ) -> Result<(), ProbeError>;
}

/// List the immediate children of `dir`. Hidden entries are included; `.` and
/// `..` are never returned.
pub(crate) fn list_children(dir: &Path) -> Result<Vec<PathBuf>, ProbeError> {
    let entries = std::fs::read_dir(dir).map_err(|e| ProbeError::io("read_dir", dir, e))?;
    entries
        .map(|entry| {
            entry
                .map(|e| e.path())
                .map_err(|e| ProbeError::io("read_dir", dir, e))
        })
        .collect()
}
