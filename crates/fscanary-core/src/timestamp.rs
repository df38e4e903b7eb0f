//! Wall-clock capture timestamps for the `@timestamp` identity field.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Current wall-clock time as ISO-8601 UTC with microseconds.
/// Example: `2026-02-15T01:30:00.123456Z`
pub fn now_iso8601() -> String {
    let since_epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format_iso8601_micros(since_epoch)
}

/// Format a duration-since-epoch as ISO-8601 UTC with microsecond precision.
pub fn format_iso8601_micros(since_epoch: Duration) -> String {
    let secs = since_epoch.as_secs();
    let (year, month, day) = civil_from_days(secs / 86_400);
    let tod = secs % 86_400;
    format!(
        "{year:04}-{month:02}-{day:02}T{:02}:{:02}:{:02}.{:06}Z",
        tod / 3600,
        (tod / 60) % 60,
        tod % 60,
        since_epoch.subsec_micros()
    )
}

/// Proleptic Gregorian (year, month, day) for a day count since 1970-01-01.
///
/// Works in 400-year eras counted from 0000-03-01, so the leap day is the
/// last day of each shifted year and no month table is needed.
fn civil_from_days(days: u64) -> (u64, u64, u64) {
    // 719_468 days from 0000-03-01 to 1970-01-01.
    let z = days + 719_468;
    let era = z / 146_097;
    let doe = z % 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + u64::from(month <= 2);
    (year, month, day)
}
