//! Builder configuration.

use serde::{Deserialize, Serialize};

/// Environment variable toggling history-preservation mode.
pub const PRESERVE_HISTORY_VAR: &str = "LINEAGE_PRESERVE_HISTORY";

/// Configuration fixed when a lineage builder is constructed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageConfig {
    /// Attach catalog-declared classification, pipeline and group edges to
    /// every instance node. When off, the catalog is never consulted.
    #[serde(default)]
    pub preserve_history: bool,
}

impl LineageConfig {
    pub fn with_preserve_history(preserve_history: bool) -> Self {
        Self { preserve_history }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` first (non-fatal if `.env` is absent).
    /// `LINEAGE_PRESERVE_HISTORY` accepts `true`/`false`/`1`/`0`/`yes`/`no`
    /// and defaults to off; anything else is a
    /// [`crate::LineageError::Validation`] error.
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        let preserve_history = match std::env::var(PRESERVE_HISTORY_VAR) {
            Ok(val) => parse_flag(&val).ok_or_else(|| {
                crate::LineageError::Validation(format!(
                    "{PRESERVE_HISTORY_VAR} must be a boolean, got '{val}'"
                ))
            })?,
            Err(_) => false,
        };

        Ok(Self { preserve_history })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
