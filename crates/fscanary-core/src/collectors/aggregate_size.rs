//! AggregateSize: time stat-ing every immediate child and sum their sizes.

use std::path::Path;

use super::{Collector, ProbeVariant, list_children};
use crate::clock::Clock;
use crate::error::ProbeError;
use crate::sample::SampleRecord;

const FULL_FIELDS: &[&str] = &["dir_size_start", "dir_size_end", "dir_size"];
const REDUCED_FIELDS: &[&str] = &["dir_size_start", "dir_size_end", "dir_size_bytes"];

/// Sums the `stat` sizes of the target's immediate children.
///
/// The directory is listed again rather than reusing [`super::EntryCount`]'s
/// listing, so the two can disagree if the directory changes in between.
/// Subdirectories contribute their own entry size, not their contents.
#[derive(Debug, Clone, Copy)]
pub struct AggregateSize {
    variant: ProbeVariant,
}

impl AggregateSize {
    pub fn new(variant: ProbeVariant) -> Self {
        Self { variant }
    }

    fn size_field(&self) -> &'static str {
        self.fields()[2]
    }
}

impl Collector for AggregateSize {
    fn name(&self) -> &'static str {
        "dir_size"
    }

    fn fields(&self) -> &'static [&'static str] {
        match self.variant {
            ProbeVariant::Full => FULL_FIELDS,
            ProbeVariant::Reduced => REDUCED_FIELDS,
        }
    }

    fn collect(
        &self,
        target: &Path,
        clock: &dyn Clock,
        sample: &mut SampleRecord,
    ) -> Result<(), ProbeError> {
        let children = list_children(target)?;

        sample.set_seconds("dir_size_start", clock.now())?;
        let mut total: u64 = 0;
        for child in &children {
            // Follows symlinks; a child removed since the listing is NotFound
            // and fails the whole record.
            let meta = std::fs::metadata(child).map_err(|e| ProbeError::io("stat", child, e))?;
            total += meta.len();
        }
        sample.set_seconds("dir_size_end", clock.now())?;

        log::debug!("{}: {total} bytes in {} entries", target.display(), children.len());
        sample.set_count(self.size_field(), total)
    }
}
