//! `SQLite` implementation of [`OutboxWriter`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use schoolhub_app::ports::OutboxWriter;
use schoolhub_domain::error::SchoolHubError;
use schoolhub_domain::id::TenantId;
use schoolhub_domain::outbox::{NewOutboxEvent, OutboxEvent};

use crate::codec;
use crate::error::StorageError;

struct Wrapper(OutboxEvent);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let tenant_id: String = row.try_get("tenant_id")?;
        let payload: String = row.try_get("payload")?;
        let status: String = row.try_get("status")?;
        let process_after: String = row.try_get("process_after")?;
        let created_at: String = row.try_get("created_at")?;

        Ok(Self(OutboxEvent {
            id: codec::decode_parsed(&id)?,
            tenant_id: codec::decode_parsed(&tenant_id)?,
            event_type: row.try_get("event_type")?,
            payload: codec::decode_json(&payload)?,
            status: codec::decode_parsed(&status)?,
            process_after: codec::decode_timestamp(&process_after)?,
            created_at: codec::decode_timestamp(&created_at)?,
        }))
    }
}

/// `SQLite`-backed outbox.
pub struct SqliteOutboxRepository {
    pool: SqlitePool,
}

impl SqliteOutboxRepository {
    /// Create a new repository backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Records of a tenant, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the query fails.
    pub async fn list_for_tenant(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<OutboxEvent>, SchoolHubError> {
        let rows: Vec<Wrapper> =
            sqlx::query_as("SELECT * FROM outbox WHERE tenant_id = ? ORDER BY created_at, id")
                .bind(tenant_id.to_string())
                .fetch_all(&self.pool)
                .await
                .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }
}

impl OutboxWriter for SqliteOutboxRepository {
    async fn create_outbox_event(
        &self,
        event: NewOutboxEvent,
    ) -> Result<OutboxEvent, SchoolHubError> {
        let event = OutboxEvent::pending(event, schoolhub_domain::time::now());
        let payload = serde_json::to_string(&event.payload).map_err(StorageError::from)?;

        sqlx::query(
            "INSERT INTO outbox (id, tenant_id, event_type, payload, status, process_after, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(event.id.to_string())
        .bind(event.tenant_id.to_string())
        .bind(&event.event_type)
        .bind(&payload)
        .bind(event.status.as_str())
        .bind(codec::encode_timestamp(event.process_after))
        .bind(codec::encode_timestamp(event.created_at))
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;

        Ok(event)
    }
}
