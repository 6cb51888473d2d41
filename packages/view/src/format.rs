//! Display formatting for counts, rates and timestamps.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};

/// Placeholder for a missing value.
pub const MISSING: &str = "--";

/// Compact count: `1.2M`, `45.7K`, or the plain integer below 1 000.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_number(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

#[must_use]
pub fn format_optional_number(n: Option<u64>) -> String {
    n.map_or_else(|| MISSING.to_string(), format_number)
}

/// A rate already expressed in percent, printed as the server sent it.
#[must_use]
pub fn format_percent(rate: f64) -> String {
    format!("{rate}%")
}

/// A 0..1 ratio as a one-decimal percentage.
#[must_use]
pub fn format_ratio(ratio: Option<f64>) -> String {
    ratio.map_or_else(|| MISSING.to_string(), |r| format!("{:.1}%", r * 100.0))
}

/// A 0..1 correlation coefficient as a whole percentage.
#[must_use]
pub fn format_correlation(correlation: f64) -> String {
    format!("{:.0}%", correlation * 100.0)
}

/// Calendar date (`YYYY-MM-DD`) of a server timestamp.
///
/// Accepts RFC 3339, naive ISO 8601 date-times and plain dates. Anything
/// else is returned unchanged.
#[must_use]
pub fn format_date(timestamp: &str) -> String {
    let trimmed = timestamp.trim();

    let date = DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.date_naive())
        .or_else(|_| {
            NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.date())
        })
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y-%m-%d"));

    match date {
        Ok(date) => date.format("%Y-%m-%d").to_string(),
        Err(e) => {
            log::debug!("Unrecognised timestamp '{timestamp}': {e}");
            timestamp.to_string()
        }
    }
}

/// Wall-clock time for a "last updated" label.
#[must_use]
pub fn format_clock<T: Timelike>(time: &T) -> String {
    format!("{:02}:{:02}:{:02}", time.hour(), time.minute(), time.second())
}
