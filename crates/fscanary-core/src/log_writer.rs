//! Append-only CSV log with lazy header emission.
//!
//! The header is written at most once per log file: only when the file did not
//! exist when the writer was opened. An existing file, even a zero-byte one,
//! is trusted as-is and never gets a header. No locking is done; one writer per
//! file at a time.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::ProbeError;
use crate::sample::SampleRecord;

/// Default log file name.
pub const DEFAULT_LOG_FILE: &str = "canary.csv";

/// Appends sample records to one log file.
pub struct AppendLogWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    header_pending: bool,
    rows_written: u64,
}

impl AppendLogWriter {
    /// Open `path` for appending, creating it if absent.
    pub fn open(path: &Path) -> Result<Self, ProbeError> {
        let header_pending = !path.exists();
        if !header_pending && std::fs::metadata(path).is_ok_and(|m| m.len() == 0) {
            log::warn!(
                "{} exists but is empty; rows will be appended without a header",
                path.display()
            );
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| ProbeError::Log {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            header_pending,
            rows_written: 0,
        })
    }

    /// Append one record, preceded by the header line if still pending.
    ///
    /// An incomplete record is rejected before anything is written.
    pub fn write(&mut self, record: &SampleRecord) -> Result<(), ProbeError> {
        let row = record.row_line()?;
        if self.header_pending {
            log::debug!("writing header to {}", self.path.display());
            let header = record.header_line();
            self.write_line(&header)?;
            self.header_pending = false;
        }
        self.write_line(&row)?;
        self.writer.flush().map_err(|e| self.log_err(e))?;
        self.rows_written += 1;
        Ok(())
    }

    /// Flush and close the log, surfacing any error.
    pub fn finish(mut self) -> Result<u64, ProbeError> {
        log::debug!("Closing file {}", self.path.display());
        self.writer.flush().map_err(|e| self.log_err(e))?;
        Ok(self.rows_written)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the next write will emit the header line first.
    pub fn header_pending(&self) -> bool {
        self.header_pending
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    fn write_line(&mut self, line: &str) -> Result<(), ProbeError> {
        writeln!(self.writer, "{line}").map_err(|e| self.log_err(e))
    }

    fn log_err(&self, source: std::io::Error) -> ProbeError {
        ProbeError::Log {
            path: self.path.clone(),
            source,
        }
    }
}
