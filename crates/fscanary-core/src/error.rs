//! Error types for probing and charting.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure while probing a target directory or appending to the log.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The requested target directory does not exist.
    #[error("Dir not found {}", .0.display())]
    TargetNotFound(PathBuf),

    /// A filesystem operation inside a collector failed.
    #[error("{op} failed for {}: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The payload read back differs from the payload written.
    #[error("payload mismatch at element {index}")]
    PayloadMismatch { index: usize },

    /// The requested payload matrix is too large to allocate.
    #[error("payload of {rows}×{cols} doubles is too large")]
    PayloadTooLarge { rows: usize, cols: usize },

    /// A collector tried to set a field the schema does not declare.
    #[error("field `{0}` is not part of the record schema")]
    UnknownField(&'static str),

    /// A record reached the writer with an unset field.
    #[error("record field `{0}` was never set")]
    IncompleteRecord(&'static str),

    /// The output log could not be opened or written.
    #[error("cannot write log {}: {source}", path.display())]
    Log {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ProbeError {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }

    /// True when the underlying cause is a missing file or directory.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::TargetNotFound(_) => true,
            Self::Io { source, .. } | Self::Log { source, .. } => {
                source.kind() == io::ErrorKind::NotFound
            }
            _ => false,
        }
    }
}

/// Failure while reading a log or rendering charts from it.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Input file not found {}", .0.display())]
    InputMissing(PathBuf),

    #[error("log {} has no header line", .0.display())]
    EmptyLog(PathBuf),

    #[error("log has no `{0}` column")]
    MissingColumn(String),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
