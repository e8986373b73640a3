//! Time and numeric conversion utilities
//!
//! Parsing is tolerant: anything that cannot be read as a value becomes
//! `None` so a single bad point never aborts a run. Formatting is fixed
//! precision so output files are stable across runs.

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};

/// Output form for timestamps: whole seconds, UTC designator
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Decimal places written for latitude/longitude
pub const COORDINATE_PRECISION: usize = 7;

/// Decimal places written for elevation
pub const ELEVATION_PRECISION: usize = 2;

/// Parse a GPX timestamp and normalize it to UTC
///
/// Accepts RFC 3339 with `Z` or a numeric offset, plus the offset forms
/// without a colon. Timestamps without any zone designator are read as UTC.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    const WITH_OFFSET: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];
    const WITHOUT_OFFSET: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    for fmt in WITH_OFFSET {
        if let Ok(dt) = DateTime::parse_from_str(text, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for fmt in WITHOUT_OFFSET {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(naive.and_utc());
        }
    }

    None
}

/// Format a timestamp as `YYYY-MM-DDTHH:MM:SSZ`, dropping fractional seconds
pub fn format_timestamp(time: &DateTime<Utc>) -> String {
    time.format(TIMESTAMP_FORMAT).to_string()
}

/// Whole seconds from `from` to `to`, truncated toward zero
///
/// Negative when `to` is earlier than `from`.
pub fn whole_second_gap(from: &DateTime<Utc>, to: &DateTime<Utc>) -> i64 {
    (*to - *from).num_seconds()
}

/// Offset a timestamp by a number of whole seconds
pub fn add_seconds(time: &DateTime<Utc>, seconds: i64) -> DateTime<Utc> {
    *time + TimeDelta::seconds(seconds)
}

/// Parse a latitude/longitude attribute value
pub fn parse_coordinate(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse an elevation value; empty or malformed text means "no elevation"
pub fn parse_elevation(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn format_coordinate(value: f64) -> String {
    format!("{:.*}", COORDINATE_PRECISION, value)
}

pub fn format_elevation(value: f64) -> String {
    format!("{:.*}", ELEVATION_PRECISION, value)
}

/// Linear interpolation between `start` and `end` at fraction `alpha`
pub fn lerp(start: f64, end: f64, alpha: f64) -> f64 {
    start + (end - start) * alpha
}
