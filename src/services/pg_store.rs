use crate::schema::{Event, EventRow, NewEvent};
use crate::services::event_store::{EventStore, StoreError};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

pub struct PgEventStore {
    pool: PgPool,
}

impl PgEventStore {
    /// Wraps an existing pool after bringing the `events` table up to date.
    pub async fn from_pool(pool: PgPool) -> anyhow::Result<Self> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        let store = Self::from_pool(pool).await?;
        tracing::info!(max_connections, "connected to postgres event store");
        Ok(store)
    }
}

#[async_trait::async_trait]
impl EventStore for PgEventStore {
    async fn insert(&self, event: NewEvent) -> Result<Uuid, StoreError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO events (author, action, from_branch, to_branch, timestamp)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&event.author)
        .bind(event.action.as_str())
        .bind(&event.from_branch)
        .bind(&event.to_branch)
        .bind(event.timestamp)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn recent(&self, limit: u32) -> Result<Vec<Event>, StoreError> {
        // seq breaks timestamp ties newest insert first
        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, author, action, from_branch, to_branch, timestamp
            FROM events
            ORDER BY timestamp DESC, seq DESC
            LIMIT $1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let id = row.id;
                Event::try_from(row).map_err(|source| StoreError::Corrupt { id, source })
            })
            .collect()
    }
}
