//! DateTime parsing and formatting helpers for scheduler-supplied timestamps.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Parse a datetime string in various common formats into a UTC [`DateTime`].
///
/// Supported formats (attempted in order):
/// 1. RFC 3339 / ISO 8601 with timezone: `"2024-01-15T10:30:00Z"`, `"2024-01-15T10:30:00+05:00"`
/// 2. ISO 8601 minute precision with `Z`: `"2024-01-15T10:30Z"` (the scheduler's nominal-time form)
/// 3. ISO 8601 with sub-seconds but no timezone: `"2024-01-15T10:30:00.123"`
/// 4. ISO 8601 without timezone (assumed UTC): `"2024-01-15T10:30:00"`
/// 5. Date only (midnight UTC): `"2024-01-15"`
///
/// Returns `None` for empty input or unrecognised formats.
pub fn parse_flexible_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%MZ") {
        return Some(Utc.from_utc_datetime(&ndt));
    }

    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&ndt));
    }

    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(Utc.from_utc_datetime(&ndt));
    }

    if let Ok(nd) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return nd
            .and_hms_opt(0, 0, 0)
            .map(|ndt| Utc.from_utc_datetime(&ndt));
    }

    None
}

/// Format at minute granularity: `"2024-01-15T10:30Z"`.
///
/// Seconds and sub-seconds are dropped, so instants within the same minute
/// format identically. Instance identities depend on this.
pub fn format_minute_iso8601(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%MZ").to_string()
}

/// Format at second granularity: `"2024-01-15T10:30:05Z"`.
pub fn format_iso8601(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
