pub mod chart;
pub mod probe;

use std::time::Duration;

use log::LevelFilter;

/// Environment variable holding the log verbosity.
pub const LOG_LEVEL_VAR: &str = "LOGLEVEL";

/// Parse a verbosity name (case-insensitive) into a level filter.
///
/// `CRITICAL` has no `log` counterpart and maps to `Error`.
pub fn parse_log_level(s: &str) -> Option<LevelFilter> {
    match s.trim().to_ascii_uppercase().as_str() {
        "CRITICAL" | "FATAL" | "ERROR" => Some(LevelFilter::Error),
        "WARNING" | "WARN" => Some(LevelFilter::Warn),
        "INFO" => Some(LevelFilter::Info),
        "DEBUG" => Some(LevelFilter::Debug),
        "TRACE" => Some(LevelFilter::Trace),
        "NOTSET" | "OFF" => Some(LevelFilter::Off),
        _ => None,
    }
}

/// Resolve the log level from `LOGLEVEL`, falling back to `default` when unset.
pub fn log_level_from(value: Option<&str>, default: LevelFilter) -> Result<LevelFilter, String> {
    match value {
        None => Ok(default),
        Some(v) => parse_log_level(v)
            .ok_or_else(|| format!("Unknown {LOG_LEVEL_VAR} '{v}' (expected CRITICAL, ERROR, WARNING, INFO, DEBUG, TRACE or NOTSET)")),
    }
}

/// Initialize the logger once, at the level read from the environment.
/// Exits with status 2 on an unrecognized level.
pub fn init_logging(default: LevelFilter) {
    let value = std::env::var(LOG_LEVEL_VAR).ok();
    let level = match log_level_from(value.as_deref(), default) {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    };
    env_logger::Builder::new().filter_level(level).init();
}

/// Parse a duration string like "5m", "30s", "1h", "100ms". A bare number is seconds.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();

    let (numeric, multiplier) = if let Some(rest) = s.strip_suffix("ms") {
        (rest, 1u64)
    } else if let Some(rest) = s.strip_suffix('s') {
        (rest, 1000)
    } else if let Some(rest) = s.strip_suffix('m') {
        (rest, 60_000)
    } else if let Some(rest) = s.strip_suffix('h') {
        (rest, 3_600_000)
    } else {
        (s, 1000)
    };

    let value: u64 = numeric
        .trim()
        .parse()
        .map_err(|_| format!("Invalid duration: {s}"))?;
    value
        .checked_mul(multiplier)
        .map(Duration::from_millis)
        .ok_or_else(|| format!("Duration too large: {s}"))
}
