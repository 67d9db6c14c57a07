use crate::services::StoreError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Failures surfaced to HTTP callers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Rejected(&'static str),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Rejected(reason) => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "status": reason })),
            )
                .into_response(),
            ApiError::Store(e) => {
                tracing::error!(error = %e, "event store call failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "status": "error" })),
                )
                    .into_response()
            }
        }
    }
}
