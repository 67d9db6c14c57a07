use crate::schema::{Event, NewEvent};
use crate::services::event_store::{EventStore, StoreError};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Process-local store; contents are lost on restart.
#[derive(Default)]
pub struct MemoryEventStore {
    events: RwLock<Vec<Event>>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }
}

#[async_trait::async_trait]
impl EventStore for MemoryEventStore {
    async fn insert(&self, event: NewEvent) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        self.events.write().await.push(event.into_event(id));
        Ok(id)
    }

    async fn recent(&self, limit: u32) -> Result<Vec<Event>, StoreError> {
        // newest insert first, so the stable sort keeps it first among equal timestamps
        let mut events: Vec<Event> = self.events.read().await.iter().rev().cloned().collect();
        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        events.truncate(limit as usize);
        Ok(events)
    }
}
