//! Time-series charts from a canary log.
//!
//! Rows are grouped by `path`. For every group and every known metric whose
//! columns are present, two charts are written: the metric value over time and
//! the operation latency (`end - start`) over time. The x-axis is the
//! operation's monotonic start time in seconds.

mod svg;
mod table;

use std::path::{Path, PathBuf};

pub use svg::LineChart;
pub use table::LogTable;

use crate::error::ChartError;

/// Metric base names plotted by [`render_charts`], in output order.
pub const METRICS: &[&str] = &["glob", "dir_size", "write_file", "read_file"];

/// Columns tried, in order, for a metric's value.
fn value_columns(metric: &str) -> [String; 3] {
    [
        metric.to_string(),
        format!("{metric}_count"),
        format!("{metric}_bytes"),
    ]
}

/// File name stem for a probed path: one leading `/` dropped, the remaining
/// separators replaced by `_`.
///
/// Stems never start with `.`, so chart files are never hidden: `/` becomes
/// `root`, a `.` component `cwd`, a `..` component `up`.
pub fn chart_stem(path: &str) -> String {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let stem = trimmed
        .split(['/', '\\'])
        .filter(|c| !c.is_empty())
        .map(|c| match c {
            "." => "cwd",
            ".." => "up",
            other => other,
        })
        .collect::<Vec<_>>()
        .join("_");
    if stem.is_empty() {
        "root".to_string()
    } else if stem.starts_with('.') {
        format!("_{stem}")
    } else {
        stem
    }
}

/// Default output directory for charts of `input`: a directory in `base`
/// named after the input's file stem, spaces replaced by `_`.
pub fn default_output_dir(base: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().replace(' ', "_"))
        .unwrap_or_else(|| "canary".to_string());
    base.join(stem)
}

/// The value chart and latency chart for one metric of one path.
pub fn metric_charts(
    table: &LogTable,
    path: &str,
    rows: &[usize],
    metric: &str,
) -> Option<(LineChart, LineChart)> {
    let start = table.column(&format!("{metric}_start"))?;
    let end = table.column(&format!("{metric}_end"))?;
    let value = value_columns(metric)
        .iter()
        .find_map(|c| table.column(c))?;

    let mut values = Vec::with_capacity(rows.len());
    let mut latencies = Vec::with_capacity(rows.len());
    for &row in rows {
        let Some(t0) = table.number(row, start) else {
            continue;
        };
        if let Some(v) = table.number(row, value) {
            values.push((t0, v));
        }
        if let Some(t1) = table.number(row, end) {
            latencies.push((t0, t1 - t0));
        }
    }
    values.sort_by(|a, b| a.0.total_cmp(&b.0));
    latencies.sort_by(|a, b| a.0.total_cmp(&b.0));

    let value_chart = LineChart {
        title: format!("{path}: {metric}"),
        x_label: "start (s, monotonic)".to_string(),
        y_label: table.header()[value].clone(),
        points: values,
    };
    let time_chart = LineChart {
        title: format!("{path}: {metric} latency"),
        x_label: "start (s, monotonic)".to_string(),
        y_label: "seconds".to_string(),
        points: latencies,
    };
    Some((value_chart, time_chart))
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> ChartError {
    let path = path.to_path_buf();
    move |source| ChartError::Io { path, source }
}

/// Render all charts for `table` into `out_dir`, creating it if needed.
/// Returns the written files.
pub fn render_charts(table: &LogTable, out_dir: &Path) -> Result<Vec<PathBuf>, ChartError> {
    std::fs::create_dir_all(out_dir).map_err(io_err(out_dir))?;

    let mut written = Vec::new();
    for (path, rows) in table.group_by_path()? {
        let stem = chart_stem(&path);
        for metric in METRICS {
            let Some((value_chart, time_chart)) = metric_charts(table, &path, &rows, metric) else {
                log::debug!("{path}: no columns for {metric}, skipping");
                continue;
            };
            for (suffix, chart) in [("count", value_chart), ("time", time_chart)] {
                let file = out_dir.join(format!("{stem}_{metric}_{suffix}.svg"));
                std::fs::write(&file, chart.to_svg()).map_err(io_err(&file))?;
                log::debug!("wrote {}", file.display());
                written.push(file);
            }
        }
    }
    Ok(written)
}
