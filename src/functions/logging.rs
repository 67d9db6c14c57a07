use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use std::time::Instant;

pub async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let event_kind = req
        .headers()
        .get(crate::services::EVENT_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let start = Instant::now();

    let response = next.run(req).await;

    let status = response.status().as_u16();
    let duration_ms = start.elapsed().as_millis() as u64;
    let event_kind = event_kind.as_deref().unwrap_or("");

    if path == "/health" {
        tracing::trace!(%method, path = %path, status, duration_ms, "health check");
    } else if response.status().is_server_error() {
        tracing::error!(%method, path = %path, status, duration_ms, event_kind, "request failed");
    } else if response.status().is_client_error() {
        tracing::warn!(%method, path = %path, status, duration_ms, event_kind, "request rejected");
    } else {
        tracing::debug!(%method, path = %path, status, duration_ms, event_kind, "request");
    }

    response
}
