pub mod event_store;
pub mod memory_store;
pub mod normalizer;
pub mod payload;
pub mod pg_store;

pub use event_store::*;
pub use memory_store::*;
pub use normalizer::*;
pub use pg_store::*;

use crate::config::StoreBackend;
use std::sync::Arc;

pub async fn open_store(backend: &StoreBackend) -> anyhow::Result<Arc<dyn EventStore>> {
    match backend {
        StoreBackend::Postgres {
            database_url,
            max_connections,
        } => Ok(Arc::new(
            PgEventStore::connect(database_url, *max_connections).await?,
        )),
        StoreBackend::Memory => {
            tracing::warn!("using in-memory event store, events are lost on restart");
            Ok(Arc::new(MemoryEventStore::new()))
        }
    }
}
