//! Parsed canary log: header names plus string cells.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::ChartError;
use crate::sample::PATH_FIELD;

/// A canary log loaded into memory.
#[derive(Debug, Clone)]
pub struct LogTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl LogTable {
    /// Read and parse the log at `path`.
    pub fn read(path: &Path) -> Result<Self, ChartError> {
        if !path.exists() {
            return Err(ChartError::InputMissing(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path).map_err(|source| ChartError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).ok_or_else(|| ChartError::EmptyLog(PathBuf::from(path)))
    }

    /// Parse log text. `None` when there is no header line.
    pub fn parse(text: &str) -> Option<Self> {
        let mut lines = text.lines().filter(|l| !l.trim().is_empty());
        let header: Vec<String> = split(lines.next()?);

        let mut rows = Vec::new();
        for (i, line) in lines.enumerate() {
            let cells = split(line);
            if cells.len() != header.len() {
                log::warn!(
                    "skipping row {}: {} fields, header has {}",
                    i + 2,
                    cells.len(),
                    header.len()
                );
                continue;
            }
            rows.push(cells);
        }
        Some(Self { header, rows })
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    /// Row indices grouped by `path` value, ordered by path.
    pub fn group_by_path(&self) -> Result<BTreeMap<String, Vec<usize>>, ChartError> {
        let col = self
            .column(PATH_FIELD)
            .ok_or_else(|| ChartError::MissingColumn(PATH_FIELD.to_string()))?;
        let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (i, row) in self.rows.iter().enumerate() {
            groups.entry(row[col].clone()).or_default().push(i);
        }
        Ok(groups)
    }

    /// Numeric value of `row[col]`, if it parses.
    pub fn number(&self, row: usize, col: usize) -> Option<f64> {
        self.rows.get(row)?.get(col)?.trim().parse().ok()
    }
}

fn split(line: &str) -> Vec<String> {
    line.split(',').map(|c| c.trim().to_string()).collect()
}
