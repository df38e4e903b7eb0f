//! # fscanary-core
//!
//! **A canary for filesystems.**
//!
//! `fscanary-core` times the basic operations a healthy filesystem should do
//! quickly (listing a directory, stat-ing its entries, writing and reading back
//! a large file) and appends the timings to a CSV log. Rising latencies in that
//! log show a degrading mount before it fails outright.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::PathBuf;
//! use fscanary_core::{ProbeConfig, ProbeRunner};
//!
//! let runner = ProbeRunner::new(ProbeConfig::default());
//! let report = runner.run_pass(&[PathBuf::from("/mnt/shared")]).unwrap();
//! println!("{} record(s) appended", report.written.len());
//! ```
//!
//! ## Architecture
//!
//! Target → Collectors (in declared order) → SampleRecord → AppendLogWriter
//!
//! Every collector implements the [`Collector`] trait and brackets its
//! operation with readings from a monotonic [`Clock`]. The record's column
//! order is fixed by a [`Schema`] built from the collectors before any probe
//! runs, and the log header is written only when the log file is new.
//!
//! The [`chart`] module reads a log back and renders SVG time series per
//! probed path.

pub mod chart;
pub mod clock;
pub mod collectors;
pub mod error;
pub mod log_writer;
pub mod payload;
pub mod runner;
pub mod sample;
pub mod timestamp;

pub use chart::{LineChart, LogTable, render_charts};
pub use clock::{Clock, MonotonicClock};
pub use collectors::{
    AggregateSize, Collector, EntryCount, ProbeVariant, TEMP_FILE_NAME, WriteReadRoundTrip,
};
pub use error::{ChartError, ProbeError};
pub use log_writer::{AppendLogWriter, DEFAULT_LOG_FILE};
pub use payload::{DEFAULT_DATASET, DEFAULT_MATRIX_SIZE, Matrix};
pub use runner::{PassReport, ProbeConfig, ProbeRunner};
pub use sample::{PATH_FIELD, SampleRecord, Schema, TIMESTAMP_FIELD, Value};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
