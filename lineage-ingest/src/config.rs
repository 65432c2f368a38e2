use std::{net::SocketAddr, path::PathBuf, str::FromStr};

use lineage_rs::LineageConfig;

/// Host configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind the HTTP server. Env: `BIND_ADDR`, default `0.0.0.0:8080`.
    pub bind_addr: SocketAddr,
    /// Optional JSON catalog seed loaded at startup. Env: `CATALOG_PATH`.
    pub catalog_path: Option<PathBuf>,
    /// Maximum accepted event body in bytes. Env: `EVENT_BODY_LIMIT`, default 1 MiB.
    pub event_body_limit: usize,
    /// Builder settings (`LINEAGE_PRESERVE_HISTORY`).
    pub lineage: LineageConfig,
}

impl Config {
    /// Load configuration from environment variables, applying defaults.
    ///
    /// # Errors
    /// Returns an error if `BIND_ADDR` is set but not a valid socket address,
    /// or if numeric or boolean env vars cannot be parsed.
    pub fn from_env() -> anyhow::Result<Self> {
        // Also reads `.env`, so it runs before the host's own variables.
        let lineage = LineageConfig::from_env()?;

        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let bind_addr = SocketAddr::from_str(&bind_addr)
            .map_err(|e| anyhow::anyhow!("Invalid BIND_ADDR '{}': {}", bind_addr, e))?;

        let catalog_path = std::env::var("CATALOG_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        let event_body_limit = parse_env_usize("EVENT_BODY_LIMIT", 1024 * 1024)?;
        if event_body_limit == 0 {
            anyhow::bail!("Invalid EVENT_BODY_LIMIT: must be greater than zero");
        }

        Ok(Config {
            bind_addr,
            catalog_path,
            event_body_limit,
            lineage,
        })
    }
}

fn parse_env_usize(name: &str, default: usize) -> anyhow::Result<usize> {
    match std::env::var(name) {
        Ok(val) => val
            .parse::<usize>()
            .map_err(|e| anyhow::anyhow!("Invalid {}: {}", name, e)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_env_usize_falls_back_to_default() {
        std::env::remove_var("LINEAGE_INGEST_TEST_UNSET");
        assert_eq!(parse_env_usize("LINEAGE_INGEST_TEST_UNSET", 42).unwrap(), 42);
    }

    #[test]
    fn parse_env_usize_rejects_garbage() {
        std::env::set_var("LINEAGE_INGEST_TEST_LIMIT", "lots");
        let err = parse_env_usize("LINEAGE_INGEST_TEST_LIMIT", 1).unwrap_err();
        assert!(err.to_string().contains("LINEAGE_INGEST_TEST_LIMIT"));
        std::env::remove_var("LINEAGE_INGEST_TEST_LIMIT");
    }
}
