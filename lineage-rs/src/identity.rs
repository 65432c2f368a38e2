//! Deterministic identity keys for instance nodes.
//!
//! Nominal times are reduced to minute granularity before they enter a key,
//! so instants within the same minute resolve to the same partition. Feed
//! partitions finer than a minute are not distinguishable.

use crate::context::ExecutionContext;
use crate::errors::{LineageError, Result};
use crate::utils::{format_minute_iso8601, parse_flexible_datetime};

const KEY_SEPARATOR: char = '/';

/// Key of a process run: `{process}/{nominal time}`.
pub fn process_instance_key(context: &ExecutionContext) -> Result<String> {
    Ok(format!(
        "{}{KEY_SEPARATOR}{}",
        context.entity_name,
        context.nominal_time_iso8601()?
    ))
}

/// Key of a feed partition: `{feed}/{cluster}/{path}/{nominal time}`.
pub fn feed_instance_key(
    feed_name: &str,
    cluster_name: &str,
    data_path: &str,
    nominal_time: &str,
) -> Result<String> {
    let nominal = parse_flexible_datetime(nominal_time)
        .ok_or_else(|| LineageError::Format(format!("invalid nominal time '{nominal_time}'")))?;
    Ok(format!(
        "{feed_name}{KEY_SEPARATOR}{cluster_name}{KEY_SEPARATOR}{data_path}{KEY_SEPARATOR}{}",
        format_minute_iso8601(&nominal)
    ))
}
