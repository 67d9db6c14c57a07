pub mod feed;
#[cfg(feature = "embedded-frontend")]
pub mod frontend;
pub mod health;
pub mod logging;
pub mod webhook;

use crate::services::EventStore;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use std::sync::Arc;

/// Shared by every handler; the store is built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EventStore>,
    pub feed_limit: u32,
}

impl AppState {
    pub fn new(store: Arc<dyn EventStore>, feed_limit: u32) -> Self {
        Self { store, feed_limit }
    }
}

pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    let router = Router::new()
        .route("/webhook", post(webhook::receive_webhook))
        .route("/events", get(feed::list_events))
        .route("/health", get(health::handle_health));

    #[cfg(feature = "embedded-frontend")]
    let router = router
        .route("/", get(frontend::serve_frontend))
        .fallback(frontend::serve_frontend);

    router
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(axum::middleware::from_fn(logging::log_requests))
        .with_state(state)
}
