use crate::schema::{Event, NewEvent, UnknownAction};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("event store unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),
    #[error("stored event {id} is corrupt: {source}")]
    Corrupt {
        id: Uuid,
        #[source]
        source: UnknownAction,
    },
}

/// Append-only persistence for normalized events.
///
/// Implementations must return `recent` newest first by `timestamp`, at most
/// `limit` events.
#[async_trait::async_trait]
pub trait EventStore: Send + Sync {
    async fn insert(&self, event: NewEvent) -> Result<Uuid, StoreError>;
    async fn recent(&self, limit: u32) -> Result<Vec<Event>, StoreError>;
}
