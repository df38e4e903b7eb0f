//! `fscanary probe`: probe directories and append records to the log.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use fscanary_core::{PassReport, ProbeConfig, ProbeRunner, ProbeVariant};
use log::LevelFilter;

/// Arguments of the probe command.
pub struct ProbeCommandConfig<'a> {
    pub paths: &'a [String],
    pub output: &'a str,
    pub variant: ProbeVariant,
    pub matrix_size: usize,
    pub verify_payload: bool,
    pub interval: Option<&'a str>,
    pub passes: Option<u64>,
    pub fail_on_missing: bool,
}

/// Run the probe command.
pub fn run(cfg: ProbeCommandConfig<'_>) {
    super::init_logging(LevelFilter::Error);

    let interval = match cfg.interval.map(super::parse_duration).transpose() {
        Ok(iv) => iv,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    };
    let max_passes = match (interval, cfg.passes) {
        (_, Some(n)) => Some(n),
        (None, None) => Some(1),
        (Some(_), None) => None,
    };

    let targets: Vec<PathBuf> = cfg.paths.iter().map(PathBuf::from).collect();
    let config = ProbeConfig {
        variant: cfg.variant,
        output: PathBuf::from(cfg.output),
        matrix_size: cfg.matrix_size,
        verify_payload: cfg.verify_payload,
    };
    if let Err(e) = config.validate() {
        eprintln!("Error: {e}");
        std::process::exit(2);
    }
    let runner = ProbeRunner::new(config);

    let running = Arc::new(AtomicBool::new(true));
    if interval.is_some() {
        let r = running.clone();
        if let Err(e) = ctrlc::set_handler(move || r.store(false, Ordering::SeqCst)) {
            log::warn!("cannot install Ctrl+C handler: {e}");
        }
    }

    let mut status = PassStatus::default();
    let mut pass = 0u64;
    while running.load(Ordering::SeqCst) && max_passes.is_none_or(|n| pass < n) {
        let started = Instant::now();
        match runner.run_pass_with(&targets, announce_missing) {
            Ok(report) => {
                print_report(&report);
                status.add(&report);
            }
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        pass += 1;

        if let Some(iv) = interval
            && max_passes.is_none_or(|n| pass < n)
        {
            wait(started + iv, &running);
        }
    }

    std::process::exit(status.exit_code(cfg.fail_on_missing));
}

fn announce_missing(path: &Path) {
    println!("Dir not found {}", path.display());
}

fn print_report(report: &PassReport) {
    for (path, e) in &report.failed {
        eprintln!("Probe failed for {}: {e}", path.display());
    }
}

fn wait(deadline: Instant, running: &AtomicBool) {
    while Instant::now() < deadline && running.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(10));
    }
}

/// Outcome accumulated over every pass of one invocation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct PassStatus {
    missing: usize,
    failed: usize,
}

impl PassStatus {
    fn add(&mut self, report: &PassReport) {
        self.missing += report.missing.len();
        self.failed += report.failed.len();
    }

    /// Missing targets never fail the run unless asked to; failed probes do.
    fn exit_code(&self, fail_on_missing: bool) -> i32 {
        if self.failed > 0 || (fail_on_missing && self.missing > 0) {
            1
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(missing: usize, failed: usize) -> PassReport {
        let mut r = PassReport::default();
        for i in 0..missing {
            r.missing.push(PathBuf::from(format!("/missing/{i}")));
        }
        for i in 0..failed {
            r.failed.push((
                PathBuf::from(format!("/failed/{i}")),
                fscanary_core::ProbeError::PayloadMismatch { index: i },
            ));
        }
        r
    }

    #[test]
    fn test_all_missing_exits_zero_by_default() {
        let mut s = PassStatus::default();
        s.add(&report(3, 0));
        assert_eq!(s.exit_code(false), 0);
        assert_eq!(s.exit_code(true), 1);
    }

    #[test]
    fn test_failed_probe_exits_one() {
        let mut s = PassStatus::default();
        s.add(&report(0, 1));
        assert_eq!(s.exit_code(false), 1);
    }

    #[test]
    fn test_status_accumulates_passes() {
        let mut s = PassStatus::default();
        s.add(&report(1, 0));
        s.add(&report(2, 1));
        assert_eq!(s, PassStatus { missing: 3, failed: 1 });
    }

    #[test]
    fn test_clean_run_exits_zero() {
        let mut s = PassStatus::default();
        s.add(&report(0, 0));
        assert_eq!(s.exit_code(true), 0);
    }

    #[test]
    fn test_wait_returns_when_stopped() {
        let running = AtomicBool::new(false);
        let t0 = Instant::now();
        wait(t0 + Duration::from_secs(60), &running);
        assert!(t0.elapsed() < Duration::from_secs(5));
    }
}
