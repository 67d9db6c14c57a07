use crate::error::ApiError;
use crate::functions::AppState;
use crate::schema::Event;
use crate::services::{EventStore, StoreError};
use axum::Json;
use axum::extract::State;

pub async fn list_recent(store: &dyn EventStore, limit: u32) -> Result<Vec<Event>, StoreError> {
    store.recent(limit).await
}

pub async fn list_events(State(state): State<AppState>) -> Result<Json<Vec<Event>>, ApiError> {
    let events = list_recent(state.store.as_ref(), state.feed_limit).await?;
    tracing::debug!(count = events.len(), "served event feed");
    Ok(Json(events))
}
