//! WriteReadRoundTrip: time writing and reading back a synthetic payload.
//!
//! Generates a random `f64` matrix, writes it as a single dataset into a
//! container file inside the target directory, reads the dataset back in full,
//! and deletes the file. The temp file never outlives one `collect` call: the
//! normal path deletes it explicitly (propagating any error), and a drop guard
//! removes it on every early return.

use std::io;
use std::path::{Path, PathBuf};

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::Collector;
use crate::clock::Clock;
use crate::error::ProbeError;
use crate::payload::{self, DEFAULT_DATASET, DEFAULT_MATRIX_SIZE, Matrix};
use crate::sample::SampleRecord;

/// Reserved hidden file name for the payload inside the target directory.
pub const TEMP_FILE_NAME: &str = ".tempfile";

const FIELDS: &[&str] = &[
    "write_file_start",
    "write_file_end",
    "write_file",
    "read_file",
    "read_file_start",
    "read_file_end",
];

/// Writes and re-reads a `rows × cols` payload in the target directory.
#[derive(Debug, Clone)]
pub struct WriteReadRoundTrip {
    rows: usize,
    cols: usize,
    dataset: String,
    verify: bool,
    seed: Option<u64>,
}

impl Default for WriteReadRoundTrip {
    fn default() -> Self {
        Self::new(DEFAULT_MATRIX_SIZE, DEFAULT_MATRIX_SIZE)
    }
}

impl WriteReadRoundTrip {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            dataset: DEFAULT_DATASET.to_string(),
            verify: false,
            seed: None,
        }
    }

    /// Compare the matrix read back with the one written, element for element.
    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Use a deterministic generator instead of the thread RNG.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn generate(&self) -> Result<Matrix, ProbeError> {
        let matrix = match self.seed {
            Some(seed) => Matrix::random(self.rows, self.cols, &mut StdRng::seed_from_u64(seed)),
            None => Matrix::random(self.rows, self.cols, &mut rand::rng()),
        };
        matrix.ok_or(ProbeError::PayloadTooLarge {
            rows: self.rows,
            cols: self.cols,
        })
    }
}

impl Collector for WriteReadRoundTrip {
    fn name(&self) -> &'static str {
        "write_file"
    }

    fn fields(&self) -> &'static [&'static str] {
        FIELDS
    }

    fn collect(
        &self,
        target: &Path,
        clock: &dyn Clock,
        sample: &mut SampleRecord,
    ) -> Result<(), ProbeError> {
        let written = self.generate()?;
        let path = target.join(TEMP_FILE_NAME);

        sample.set_seconds("write_file_start", clock.now())?;
        let guard = TempFileGuard::new(&path);
        payload::write_container(&path, &self.dataset, &written)
            .map_err(|e| ProbeError::io("write payload", &path, e))?;
        sample.set_seconds("write_file_end", clock.now())?;

        let size = std::fs::metadata(&path)
            .map_err(|e| ProbeError::io("stat payload", &path, e))?
            .len();
        log::debug!("File size: {size} bytes");
        // One stat serves both columns; historical logs carry the same value twice.
        sample.set_count("write_file", size)?;
        sample.set_count("read_file", size)?;

        sample.set_seconds("read_file_start", clock.now())?;
        let read = payload::read_container(&path, &self.dataset)
            .map_err(|e| ProbeError::io("read payload", &path, e))?;
        sample.set_seconds("read_file_end", clock.now())?;

        if self.verify
            && let Some(index) = written.first_mismatch(&read)
        {
            return Err(ProbeError::PayloadMismatch { index });
        }

        guard
            .remove()
            .map_err(|e| ProbeError::io("remove payload", &path, e))
    }
}

/// Deletes the payload file on drop unless [`TempFileGuard::remove`] ran.
struct TempFileGuard {
    path: PathBuf,
    armed: bool,
}

impl TempFileGuard {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            armed: true,
        }
    }

    fn remove(mut self) -> io::Result<()> {
        self.armed = false;
        std::fs::remove_file(&self.path)
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => log::debug!("removed leftover payload {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("cannot remove payload {}: {e}", self.path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::tests::SteppingClock;
    use crate::sample::{Schema, Value};

    fn record() -> SampleRecord {
        SampleRecord::new(&Schema::new(FIELDS.to_vec()))
    }

    #[test]
    fn test_round_trip_fills_fields_and_cleans_up() {
        let tmp = tempfile::tempdir().unwrap();
        let c = WriteReadRoundTrip::new(32, 32).with_verify(true).with_seed(1);
        let mut rec = record();
        c.collect(tmp.path(), &SteppingClock::new(1.0, 1.0), &mut rec)
            .unwrap();

        assert!(rec.is_complete());
        assert!(!tmp.path().join(TEMP_FILE_NAME).exists());
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);

        assert_eq!(rec.get("write_file_start"), Some(&Value::Seconds(1.0)));
        assert_eq!(rec.get("write_file_end"), Some(&Value::Seconds(2.0)));
        assert_eq!(rec.get("read_file_start"), Some(&Value::Seconds(3.0)));
        assert_eq!(rec.get("read_file_end"), Some(&Value::Seconds(4.0)));
    }

    #[test]
    fn test_write_and_read_sizes_are_the_same_stat() {
        let tmp = tempfile::tempdir().unwrap();
        let c = WriteReadRoundTrip::new(16, 8).with_seed(9);
        let mut rec = record();
        c.collect(tmp.path(), &SteppingClock::new(0.0, 1.0), &mut rec)
            .unwrap();

        let Some(Value::Count(w)) = rec.get("write_file") else {
            panic!("write_file not set");
        };
        assert_eq!(rec.get("read_file"), Some(&Value::Count(*w)));
        // Data section alone is 16 * 8 doubles.
        assert!(*w > 16 * 8 * 8);
    }

    #[test]
    fn test_seeded_payload_is_reproducible() {
        let a = WriteReadRoundTrip::new(4, 4).with_seed(3).generate().unwrap();
        let b = WriteReadRoundTrip::new(4, 4).with_seed(3).generate().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_oversized_payload_fails_before_timing() {
        let tmp = tempfile::tempdir().unwrap();
        let c = WriteReadRoundTrip::new(usize::MAX, usize::MAX);
        let mut rec = record();
        let err = c
            .collect(tmp.path(), &SteppingClock::new(0.0, 1.0), &mut rec)
            .unwrap_err();
        assert!(matches!(err, ProbeError::PayloadTooLarge { .. }));
        assert_eq!(rec.get("write_file_start"), None);
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_failure_propagates_and_leaves_no_file() {
        let tmp = tempfile::tempdir().unwrap();
        // A directory squatting on the reserved name makes the write fail.
        std::fs::create_dir(tmp.path().join(TEMP_FILE_NAME)).unwrap();
        let c = WriteReadRoundTrip::new(2, 2);
        let mut rec = record();
        let err = c
            .collect(tmp.path(), &SteppingClock::new(0.0, 1.0), &mut rec)
            .unwrap_err();
        assert!(matches!(err, ProbeError::Io { op: "write payload", .. }));
        assert!(!rec.is_complete());
        assert!(!tmp.path().join(TEMP_FILE_NAME).is_file());
    }

    #[test]
    fn test_guard_removes_file_on_drop() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(TEMP_FILE_NAME);
        std::fs::write(&path, b"partial").unwrap();
        {
            let _guard = TempFileGuard::new(&path);
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_guard_remove_reports_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let guard = TempFileGuard::new(&tmp.path().join(TEMP_FILE_NAME));
        let err = guard.remove().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    #[ignore] // 128 MiB payload. Run with: cargo test -- --ignored
    fn test_default_size_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let c = WriteReadRoundTrip::default().with_verify(true);
        let mut rec = record();
        c.collect(tmp.path(), &crate::clock::MonotonicClock, &mut rec)
            .unwrap();
        let Some(Value::Count(size)) = rec.get("write_file") else {
            panic!("write_file not set");
        };
        assert!(*size >= (DEFAULT_MATRIX_SIZE * DEFAULT_MATRIX_SIZE * 8) as u64);
        assert!(!tmp.path().join(TEMP_FILE_NAME).exists());
    }
}
