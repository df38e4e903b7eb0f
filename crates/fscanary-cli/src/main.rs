//! CLI for fscanary, a canary for filesystems.

mod commands;

use clap::{Parser, Subcommand};
use fscanary_core::ProbeVariant;

#[derive(Parser)]
#[command(name = "fscanary")]
#[command(about = "fscanary: time directory listing, sizing and file round trips into a CSV log")]
#[command(version = fscanary_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe one or more directories and append one record per directory to the log
    Probe {
        /// Directories to probe
        #[arg(short = 'p', long = "path", required = true, num_args = 1..)]
        paths: Vec<String>,

        /// Log file (created if absent, appended otherwise)
        #[arg(short, long, default_value = fscanary_core::DEFAULT_LOG_FILE)]
        output: String,

        /// Column layout: full (timestamp + payload round trip) or reduced (listing and size only)
        #[arg(long, default_value = "full")]
        variant: ProbeVariant,

        /// Side length of the square payload matrix of doubles
        #[arg(long, default_value_t = fscanary_core::DEFAULT_MATRIX_SIZE)]
        matrix_size: usize,

        /// Check that the payload read back equals the payload written
        #[arg(long)]
        verify_payload: bool,

        /// Repeat passes at this interval (e.g. "100ms", "30s", "5m", "1h"); default: one pass
        #[arg(long)]
        interval: Option<String>,

        /// Number of passes (default: 1, or until Ctrl+C with --interval)
        #[arg(long)]
        passes: Option<u64>,

        /// Exit with status 1 if any directory was not found
        #[arg(long)]
        fail_on_missing: bool,
    },

    /// Render per-path time-series charts (SVG) from a canary log
    Chart {
        /// Canary log to read
        #[arg(short, long)]
        input: String,

        /// Output directory (default: ./<input file stem>)
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Probe {
            paths,
            output,
            variant,
            matrix_size,
            verify_payload,
            interval,
            passes,
            fail_on_missing,
        } => commands::probe::run(commands::probe::ProbeCommandConfig {
            paths: &paths,
            output: &output,
            variant,
            matrix_size,
            verify_payload,
            interval: interval.as_deref(),
            passes,
            fail_on_missing,
        }),
        Commands::Chart { input, output } => commands::chart::run(&input, output.as_deref()),
    }
}
