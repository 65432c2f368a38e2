//! Parser for the scheduler's flat counters string.
//!
//! Format: `key:value[,key:value...]`, each value a signed 64-bit integer.
//! Entries split on the first `:` only. A trailing `,` is tolerated.

use std::collections::BTreeMap;

use crate::errors::{LineageError, Result};

const ENTRY_SEPARATOR: char = ',';
const KEY_VALUE_SEPARATOR: char = ':';

/// Parse a counters string. Blank input yields an empty map.
///
/// All-or-nothing: any malformed entry fails the whole string, so callers
/// never apply a partial set.
pub fn parse_counters(input: &str) -> Result<BTreeMap<String, i64>> {
    let mut counters = BTreeMap::new();
    if input.trim().is_empty() {
        return Ok(counters);
    }

    let input = input.strip_suffix(ENTRY_SEPARATOR).unwrap_or(input);
    for entry in input.split(ENTRY_SEPARATOR) {
        let (key, value) = entry
            .split_once(KEY_VALUE_SEPARATOR)
            .ok_or_else(|| LineageError::Format(format!("counter '{entry}' has no value")))?;
        if key.is_empty() {
            return Err(LineageError::Format(format!("counter '{entry}' has no name")));
        }
        let value = value.parse::<i64>().map_err(|e| {
            LineageError::Format(format!("invalid value for counter '{key}': {e}"))
        })?;
        counters.insert(key.to_string(), value);
    }
    Ok(counters)
}
