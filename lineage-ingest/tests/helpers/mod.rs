#![allow(dead_code)]

use std::{path::PathBuf, sync::Arc};

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use lineage_ingest::{router, seed::CatalogSeed, AppState};
use lineage_rs::catalog::InMemoryCatalog;
use lineage_rs::driver::InMemoryDriver;
use lineage_rs::LineageConfig;

pub const SEED: &str = r#"{
    "clusters": ["primary-cluster", "backup-cluster"],
    "users": ["falcon-user"],
    "datasources": ["mysql-db"],
    "processes": [
        {
            "name": "sample-process",
            "tags": ["classification=secure"],
            "pipelines": ["ads-pipeline"]
        }
    ],
    "feeds": [
        { "name": "clicks", "tags": ["classification=secure"], "groups": ["hourly"] },
        { "name": "imp-click-join", "groups": ["hourly"] }
    ]
}"#;

/// Temporary catalog seed file plus a router over a freshly seeded store.
pub struct TestHost {
    pub dir: TempDir,
    pub seed_path: PathBuf,
    pub store: Arc<InMemoryDriver>,
    pub app: Router,
}

impl TestHost {
    pub async fn new(preserve_history: bool) -> Self {
        Self::with_body_limit(preserve_history, 1024 * 1024).await
    }

    pub async fn with_body_limit(preserve_history: bool, limit: usize) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let seed_path = dir.path().join("catalog.json");
        std::fs::write(&seed_path, SEED).expect("write catalog seed");

        let store = Arc::new(InMemoryDriver::new());
        let catalog = Arc::new(InMemoryCatalog::new());
        CatalogSeed::load(&seed_path)
            .await
            .expect("load seed")
            .apply(store.as_ref(), &catalog)
            .expect("apply seed");

        let state = AppState::new(
            store.clone(),
            catalog,
            LineageConfig::with_preserve_history(preserve_history),
        );
        let app = router(state, limit);
        Self {
            dir,
            seed_path,
            store,
            app,
        }
    }

    /// Send one request and return the status and (possibly empty) JSON body.
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    pub async fn post_event(&self, event: &Value) -> (StatusCode, Value) {
        self.send(
            Request::post("/events")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(event.to_string()))
                .expect("build request"),
        )
        .await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::get(uri).body(Body::empty()).expect("build request"))
            .await
    }
}
