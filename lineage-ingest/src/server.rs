use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tracing::{debug, info};

use lineage_rs::catalog::InMemoryCatalog;
use lineage_rs::context::ExecutionContext;
use lineage_rs::driver::{GraphDriver, InMemoryDriver};
use lineage_rs::nodes::{GraphNode, NodeType};
use lineage_rs::{record_execution, LineageConfig, LineageRecord};

use crate::error::ApiError;
use crate::locks::{lock_keys, KeyedLocks};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<InMemoryDriver>,
    pub catalog: Arc<InMemoryCatalog>,
    pub config: LineageConfig,
    pub locks: Arc<KeyedLocks>,
}

impl AppState {
    pub fn new(store: Arc<InMemoryDriver>, catalog: Arc<InMemoryCatalog>, config: LineageConfig) -> Self {
        Self {
            store,
            catalog,
            config,
            locks: Arc::new(KeyedLocks::new()),
        }
    }
}

/// Build the HTTP router.
pub fn router(state: AppState, event_body_limit: usize) -> Router {
    Router::new()
        .route(
            "/events",
            post(record_event).layer(DefaultBodyLimit::max(event_body_limit)),
        )
        .route("/nodes/{node_type}/{*name}", get(get_node))
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .with_state(state)
}

// ─── Handlers ─────────────────────────────────────────────────────────────────

/// Record one execution event; 201 with what was written.
async fn record_event(
    State(state): State<AppState>,
    Json(context): Json<ExecutionContext>,
) -> Result<(StatusCode, Json<LineageRecord>), ApiError> {
    debug!(
        entity = %context.entity_name,
        operation = ?context.operation,
        "event received"
    );

    let guards = state.locks.acquire(lock_keys(&context)).await;
    let store = state.store.clone();
    let catalog = state.catalog.clone();
    let config = state.config;

    let result = tokio::task::spawn_blocking(move || {
        let _guards = guards;
        record_execution(store.as_ref(), catalog.as_ref(), config, &context)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("event task failed: {e}")))?;
    state.locks.prune();

    let record = result?;
    info!(
        nodes = record.summary.nodes_created,
        edges = record.summary.edges_created,
        "event recorded"
    );
    Ok((StatusCode::CREATED, Json(record)))
}

/// Exact-key node lookup. Names may contain `/`.
async fn get_node(
    State(state): State<AppState>,
    Path((node_type, name)): Path<(String, String)>,
) -> Result<Json<GraphNode>, ApiError> {
    let node_type: NodeType = node_type.parse()?;
    state
        .store
        .find_node(&name, node_type)?
        .and_then(|id| state.store.node(id))
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("{node_type} '{name}'")))
}

/// Liveness check: returns 200 as long as the process is running.
async fn health_handler() -> impl IntoResponse {
    StatusCode::OK
}

/// Readiness check: returns 200 if the graph store answers.
async fn ready_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.ping() {
        Ok(()) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
