//! Shared utilities.
//!
//! Date/time helpers for the timestamps carried by scheduler events.

pub mod datetime;

pub use datetime::{format_iso8601, format_minute_iso8601, parse_flexible_datetime};
