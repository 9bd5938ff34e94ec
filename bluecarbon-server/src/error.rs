use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by the HTTP handlers
///
/// The body is always `{"error": message}`; the message is passed through
/// unchanged, including remote platform messages.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Series(#[from] bluecarbon::Error),

    #[error("Invalid JSON body: {0}")]
    Body(#[from] serde_json::Error),

    #[error("Worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Series(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Body(_) => StatusCode::BAD_REQUEST,
            ApiError::Series(_) | ApiError::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::warn!(error = %self, "Request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
