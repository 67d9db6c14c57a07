use crate::error::ApiError;
use crate::functions::AppState;
use crate::services::{EventStore, Notification, Outcome, normalize};
use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub status: &'static str,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Ingested {
    Stored(Uuid),
    Ignored(&'static str),
}

/// Normalizes one notification and persists it when it maps to an event.
pub async fn ingest(
    store: &dyn EventStore,
    notification: &Notification,
) -> Result<Ingested, ApiError> {
    let kind = notification.kind.as_deref().unwrap_or("");
    match normalize(notification, Utc::now()) {
        Outcome::Stored(event) => {
            let action = event.action;
            let id = store.insert(event).await?;
            tracing::info!(kind, %action, %id, "stored event");
            Ok(Ingested::Stored(id))
        }
        Outcome::Ignored(reason) => {
            tracing::debug!(kind, reason, "ignored notification");
            Ok(Ingested::Ignored(reason))
        }
        Outcome::Rejected(reason) => {
            tracing::warn!(kind, reason, "rejected notification");
            Err(ApiError::Rejected(reason))
        }
    }
}

pub async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<serde_json::Value>,
) -> Result<Json<WebhookAck>, ApiError> {
    let notification = Notification::from_headers(&headers, payload);
    let status = match ingest(state.store.as_ref(), &notification).await? {
        Ingested::Stored(_) => "success",
        Ingested::Ignored(_) => "ignored",
    };
    Ok(Json(WebhookAck { status }))
}
