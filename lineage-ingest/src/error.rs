use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use lineage_rs::LineageError;

/// Errors surfaced by the HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Lineage(#[from] LineageError),

    #[error("Node not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Lineage(e) => match e {
                LineageError::Consistency { .. } => StatusCode::CONFLICT,
                LineageError::Format(_)
                | LineageError::Validation(_)
                | LineageError::Serialization(_) => StatusCode::UNPROCESSABLE_ENTITY,
                LineageError::Catalog(_) => StatusCode::FAILED_DEPENDENCY,
                LineageError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
