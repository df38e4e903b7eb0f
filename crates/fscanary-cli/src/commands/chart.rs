//! `fscanary chart`: render per-path charts from a canary log.

use std::path::{Path, PathBuf};

use fscanary_core::chart::default_output_dir;
use fscanary_core::{ChartError, LogTable, render_charts};
use log::LevelFilter;

/// Run the chart command.
pub fn run(input: &str, output: Option<&str>) {
    super::init_logging(LevelFilter::Warn);

    let input = PathBuf::from(input);
    let output_dir = match output {
        Some(dir) => PathBuf::from(dir),
        None => match std::env::current_dir() {
            Ok(cwd) => default_output_dir(&cwd, &input),
            Err(e) => {
                eprintln!("Error: cannot determine current directory: {e}");
                std::process::exit(1);
            }
        },
    };

    match render(&input, &output_dir) {
        Ok(files) => {
            println!(
                "Wrote {} chart(s) to {}",
                files.len(),
                output_dir.display()
            );
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn render(input: &Path, output_dir: &Path) -> Result<Vec<PathBuf>, ChartError> {
    let table = LogTable::read(input)?;
    log::debug!(
        "{}: {} rows, columns {:?}",
        input.display(),
        table.rows().len(),
        table.header()
    );
    render_charts(&table, output_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_missing_input() {
        let tmp = tempfile::tempdir().unwrap();
        let err = render(&tmp.path().join("nope.csv"), tmp.path()).unwrap_err();
        assert!(matches!(err, ChartError::InputMissing(_)));
        assert_eq!(
            err.to_string(),
            format!("Input file not found {}", tmp.path().join("nope.csv").display())
        );
    }

    #[test]
    fn test_render_writes_charts() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("canary.csv");
        std::fs::write(
            &input,
            "path,glob_start,glob_end,glob\n/x,1.0,1.5,2\n/y,2.0,2.5,3\n",
        )
        .unwrap();
        let out = tmp.path().join("out");
        let files = render(&input, &out).unwrap();
        assert_eq!(files.len(), 4);
        assert!(out.join("x_glob_count.svg").is_file());
        assert!(out.join("y_glob_time.svg").is_file());
    }

    #[test]
    fn test_render_empty_log() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("empty.csv");
        std::fs::write(&input, "").unwrap();
        let err = render(&input, &tmp.path().join("out")).unwrap_err();
        assert!(matches!(err, ChartError::EmptyLog(_)));
    }
}
