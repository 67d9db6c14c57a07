use axum::Json;
use axum::response::IntoResponse;

pub async fn handle_health() -> impl IntoResponse {
    tracing::trace!("health check: ok");
    Json(serde_json::json!({
        "status": "healthy",
    }))
}
