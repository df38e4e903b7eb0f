//! Probe passes over one or more target directories.
//!
//! A pass visits targets strictly in order. Missing targets are reported and
//! skipped; a collector failure drops that target's record and the pass moves
//! on; only a failure to write the log itself ends the pass early.

use std::path::{Path, PathBuf};

use crate::clock::{Clock, MonotonicClock};
use crate::collectors::{AggregateSize, Collector, EntryCount, ProbeVariant, WriteReadRoundTrip};
use crate::error::ProbeError;
use crate::log_writer::{AppendLogWriter, DEFAULT_LOG_FILE};
use crate::payload::{DEFAULT_MATRIX_SIZE, payload_byte_len};
use crate::sample::{PATH_FIELD, SampleRecord, Schema, TIMESTAMP_FIELD, normalize_path};
use crate::timestamp::now_iso8601;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Configuration for a probe runner.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub variant: ProbeVariant,
    pub output: PathBuf,
    /// Side length of the square payload matrix (full variant only).
    pub matrix_size: usize,
    /// Check the payload read back against the one written.
    pub verify_payload: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            variant: ProbeVariant::Full,
            output: PathBuf::from(DEFAULT_LOG_FILE),
            matrix_size: DEFAULT_MATRIX_SIZE,
            verify_payload: false,
        }
    }
}

impl ProbeConfig {
    /// Reject settings no pass could run with.
    pub fn validate(&self) -> Result<(), ProbeError> {
        if self.variant == ProbeVariant::Full
            && payload_byte_len(self.matrix_size, self.matrix_size).is_none()
        {
            return Err(ProbeError::PayloadTooLarge {
                rows: self.matrix_size,
                cols: self.matrix_size,
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Outcome of one probe pass.
#[derive(Debug, Default)]
pub struct PassReport {
    /// Targets whose record was appended to the log.
    pub written: Vec<PathBuf>,
    /// Targets that did not exist.
    pub missing: Vec<PathBuf>,
    /// Targets whose collectors failed; nothing was written for them.
    pub failed: Vec<(PathBuf, ProbeError)>,
}

impl PassReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

/// Runs collectors over targets and appends completed records to the log.
pub struct ProbeRunner {
    config: ProbeConfig,
    collectors: Vec<Box<dyn Collector>>,
    schema: Schema,
    clock: Box<dyn Clock>,
}

impl ProbeRunner {
    /// Runner with the collector set of `config.variant`, in declared order.
    pub fn new(config: ProbeConfig) -> Self {
        let mut collectors: Vec<Box<dyn Collector>> = vec![
            Box::new(EntryCount::new(config.variant)),
            Box::new(AggregateSize::new(config.variant)),
        ];
        if config.variant == ProbeVariant::Full {
            collectors.push(Box::new(
                WriteReadRoundTrip::new(config.matrix_size, config.matrix_size)
                    .with_verify(config.verify_payload),
            ));
        }
        Self::with_collectors(config, collectors)
    }

    /// Runner with an explicit collector list.
    pub fn with_collectors(config: ProbeConfig, collectors: Vec<Box<dyn Collector>>) -> Self {
        let schema = build_schema(config.variant, &collectors);
        Self {
            config,
            collectors,
            schema,
            clock: Box::new(MonotonicClock),
        }
    }

    /// Replace the interval clock.
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Run every collector against `target` and return the completed record.
    pub fn probe(&self, target: &Path) -> Result<SampleRecord, ProbeError> {
        if !target.exists() {
            return Err(ProbeError::TargetNotFound(target.to_path_buf()));
        }

        let mut sample = SampleRecord::new(&self.schema);
        if self.schema.position(TIMESTAMP_FIELD).is_some() {
            sample.set_text(TIMESTAMP_FIELD, now_iso8601())?;
        }
        sample.set_text(PATH_FIELD, normalize_path(target))?;

        for collector in &self.collectors {
            log::debug!("{}: running {}", target.display(), collector.name());
            collector.collect(target, self.clock.as_ref(), &mut sample)?;
        }
        Ok(sample)
    }

    /// One pass over `targets`, appending to `config.output`.
    ///
    /// The log is opened on the first completed record and shared for the rest
    /// of the pass, so a pass that completes nothing leaves the log untouched.
    pub fn run_pass(&self, targets: &[PathBuf]) -> Result<PassReport, ProbeError> {
        self.run_pass_with(targets, |_| {})
    }

    /// Like [`run_pass`](Self::run_pass), calling `on_missing` for each missing
    /// target as soon as it is skipped, before later targets run.
    pub fn run_pass_with<F>(
        &self,
        targets: &[PathBuf],
        mut on_missing: F,
    ) -> Result<PassReport, ProbeError>
    where
        F: FnMut(&Path),
    {
        log::debug!(
            "Writing data for {:?} to file {}",
            targets,
            self.config.output.display()
        );

        let mut report = PassReport::default();
        let mut writer: Option<AppendLogWriter> = None;

        for target in targets {
            match self.probe(target) {
                Ok(sample) => {
                    let w = match writer.take() {
                        Some(w) => w,
                        None => AppendLogWriter::open(&self.config.output)?,
                    };
                    let w = writer.insert(w);
                    w.write(&sample)?;
                    log::info!("{}: record appended", target.display());
                    report.written.push(target.clone());
                }
                Err(ProbeError::TargetNotFound(path)) => {
                    log::warn!("Dir not found {}", path.display());
                    on_missing(&path);
                    report.missing.push(path);
                }
                Err(e) => {
                    log::error!("{}: probe aborted: {e}", target.display());
                    report.failed.push((target.clone(), e));
                }
            }
        }

        if let Some(w) = writer {
            w.finish()?;
        }
        Ok(report)
    }
}

fn build_schema(variant: ProbeVariant, collectors: &[Box<dyn Collector>]) -> Schema {
    let mut fields = Vec::new();
    if variant == ProbeVariant::Full {
        fields.push(TIMESTAMP_FIELD);
    }
    fields.push(PATH_FIELD);
    for c in collectors {
        fields.extend_from_slice(c.fields());
    }
    Schema::new(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::tests::SteppingClock;

    const FULL_HEADER: &str = "@timestamp,path,glob_start,glob_end,glob,dir_size_start,dir_size_end,dir_size,write_file_start,write_file_end,write_file,read_file,read_file_start,read_file_end";
    const REDUCED_HEADER: &str =
        "path,glob_start,glob_end,glob_count,dir_size_start,dir_size_end,dir_size_bytes";

    /// Collector that always fails, to exercise abort-per-target.
    struct Failing;

    impl Collector for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }
        fn fields(&self) -> &'static [&'static str] {
            &["failing"]
        }
        fn collect(
            &self,
            target: &Path,
            _clock: &dyn Clock,
            _sample: &mut SampleRecord,
        ) -> Result<(), ProbeError> {
            Err(ProbeError::io(
                "fail",
                target,
                std::io::Error::other("injected"),
            ))
        }
    }

    fn config(variant: ProbeVariant, output: PathBuf) -> ProbeConfig {
        ProbeConfig {
            variant,
            output,
            matrix_size: 8,
            verify_payload: true,
        }
    }

    #[test]
    fn test_full_schema_order() {
        let runner = ProbeRunner::new(config(ProbeVariant::Full, "x.csv".into()));
        assert_eq!(runner.schema().header_line(), FULL_HEADER);
    }

    #[test]
    fn test_reduced_schema_order() {
        let runner = ProbeRunner::new(config(ProbeVariant::Reduced, "x.csv".into()));
        assert_eq!(runner.schema().header_line(), REDUCED_HEADER);
    }

    #[test]
    fn test_probe_fills_every_field() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = ProbeRunner::new(config(ProbeVariant::Full, tmp.path().join("log.csv")))
            .with_clock(Box::new(SteppingClock::new(0.0, 1.0)));
        let rec = runner.probe(tmp.path()).unwrap();
        assert!(rec.is_complete());
        assert_eq!(rec.header_line(), FULL_HEADER);
    }

    #[test]
    fn test_missing_target_is_reported_and_log_untouched() {
        let tmp = tempfile::tempdir().unwrap();
        let log = tmp.path().join("log.csv");
        let runner = ProbeRunner::new(config(ProbeVariant::Reduced, log.clone()));
        let missing = tmp.path().join("missing");

        let report = runner.run_pass(std::slice::from_ref(&missing)).unwrap();
        assert_eq!(report.missing, vec![missing]);
        assert!(report.written.is_empty());
        assert!(!log.exists());
    }

    #[test]
    fn test_failed_collector_writes_nothing_and_pass_continues() {
        let tmp = tempfile::tempdir().unwrap();
        let log = tmp.path().join("log.csv");
        let a = tmp.path().join("a");
        let b = tmp.path().join("b");
        std::fs::create_dir(&a).unwrap();
        std::fs::create_dir(&b).unwrap();

        let cfg = config(ProbeVariant::Reduced, log.clone());
        let failing = ProbeRunner::with_collectors(
            cfg.clone(),
            vec![Box::new(EntryCount::new(ProbeVariant::Reduced)), Box::new(Failing)],
        );
        let report = failing.run_pass(&[a.clone(), b.clone()]).unwrap();
        assert_eq!(report.failed.len(), 2);
        assert!(report.has_failures());
        assert!(!log.exists());

        let ok = ProbeRunner::new(cfg);
        let report = ok.run_pass(&[a, b]).unwrap();
        assert_eq!(report.written.len(), 2);
        let content = std::fs::read_to_string(&log).unwrap();
        assert_eq!(content.lines().count(), 3);
        assert_eq!(content.lines().next(), Some(REDUCED_HEADER));
    }

    #[test]
    fn test_unwritable_log_aborts_pass() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = ProbeRunner::new(config(
            ProbeVariant::Reduced,
            tmp.path().join("no/such/dir/log.csv"),
        ));
        let err = runner.run_pass(&[tmp.path().to_path_buf()]).unwrap_err();
        assert!(matches!(err, ProbeError::Log { .. }));
    }

    #[test]
    fn test_missing_target_announced_before_log_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = ProbeRunner::new(config(
            ProbeVariant::Reduced,
            tmp.path().join("no/such/dir/log.csv"),
        ));
        let missing = tmp.path().join("missing");
        let mut seen = Vec::new();
        let err = runner
            .run_pass_with(&[missing.clone(), tmp.path().to_path_buf()], |p| {
                seen.push(p.to_path_buf())
            })
            .unwrap_err();
        assert!(matches!(err, ProbeError::Log { .. }));
        assert_eq!(seen, vec![missing]);
    }

    #[test]
    fn test_missing_targets_announced_in_order() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = ProbeRunner::new(config(ProbeVariant::Reduced, tmp.path().join("log.csv")));
        let a = tmp.path().join("a");
        let b = tmp.path().join("b");
        let mut seen = Vec::new();
        let report = runner
            .run_pass_with(&[a.clone(), tmp.path().to_path_buf(), b.clone()], |p| {
                seen.push(p.to_path_buf())
            })
            .unwrap();
        assert_eq!(seen, vec![a, b]);
        assert_eq!(report.missing, seen);
        assert_eq!(report.written.len(), 1);
    }

    #[test]
    fn test_validate_rejects_oversized_matrix() {
        let mut cfg = config(ProbeVariant::Full, "x.csv".into());
        assert!(cfg.validate().is_ok());
        cfg.matrix_size = usize::MAX;
        assert!(matches!(
            cfg.validate(),
            Err(ProbeError::PayloadTooLarge { .. })
        ));
        // The reduced variant never builds a payload.
        cfg.variant = ProbeVariant::Reduced;
        assert!(cfg.validate().is_ok());
    }
}
