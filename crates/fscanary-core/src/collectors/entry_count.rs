//! EntryCount: time a non-recursive listing of the target directory.

use std::path::Path;

use super::{Collector, ProbeVariant, list_children};
use crate::clock::Clock;
use crate::error::ProbeError;
use crate::sample::SampleRecord;

const FULL_FIELDS: &[&str] = &["glob_start", "glob_end", "glob"];
const REDUCED_FIELDS: &[&str] = &["glob_start", "glob_end", "glob_count"];

/// Counts immediate children of the target, hidden entries included.
#[derive(Debug, Clone, Copy)]
pub struct EntryCount {
    variant: ProbeVariant,
}

impl EntryCount {
    pub fn new(variant: ProbeVariant) -> Self {
        Self { variant }
    }

    fn count_field(&self) -> &'static str {
        self.fields()[2]
    }
}

impl Collector for EntryCount {
    fn name(&self) -> &'static str {
        "glob"
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
        sample.set_seconds("glob_start", clock.now())?;
        let children = list_children(target)?;
        sample.set_seconds("glob_end", clock.now())?;

        log::debug!("{}: {} entries", target.display(), children.len());
        sample.set_count(self.count_field(), children.len() as u64)
    }
}
