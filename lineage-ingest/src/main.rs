use std::sync::Arc;

use tokio::signal;
use tracing::{error, info};

use lineage_ingest::{router, seed::CatalogSeed, AppState, Config};
use lineage_rs::catalog::InMemoryCatalog;
use lineage_rs::driver::InMemoryDriver;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Tracing ───────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lineage_ingest=info".parse()?)
                .add_directive("lineage_rs=info".parse()?),
        )
        .json()
        .init();

    info!("lineage-ingest starting");

    // ── Config ────────────────────────────────────────────────────────────────
    let config = Config::from_env().map_err(|e| {
        error!("Configuration error: {}", e);
        e
    })?;

    info!(
        addr = %config.bind_addr,
        preserve_history = config.lineage.preserve_history,
        body_limit = config.event_body_limit,
        "configuration loaded"
    );

    // ── Graph store & catalog ─────────────────────────────────────────────────
    let store = Arc::new(InMemoryDriver::new());
    let catalog = Arc::new(InMemoryCatalog::new());

    if let Some(path) = &config.catalog_path {
        let seed = CatalogSeed::load(path).await.map_err(|e| {
            error!("Catalog seed error: {}", e);
            e
        })?;
        seed.apply(store.as_ref(), &catalog)?;
    } else {
        info!("no CATALOG_PATH set, starting with an empty catalog");
    }

    // ── Axum router ───────────────────────────────────────────────────────────
    let state = AppState::new(store, catalog, config.lineage);
    let app = router(state, config.event_body_limit);

    // ── Listen ────────────────────────────────────────────────────────────────
    info!(addr = %config.bind_addr, "listening");
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

/// Graceful shutdown on SIGTERM or Ctrl-C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => { info!("received Ctrl-C, shutting down"); }
        _ = terminate => { info!("received SIGTERM, shutting down"); }
    }
}
