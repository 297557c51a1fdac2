//! `SQLite` implementation of [`TenantRepository`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use schoolhub_app::ports::TenantRepository;
use schoolhub_domain::error::SchoolHubError;
use schoolhub_domain::id::TenantId;
use schoolhub_domain::tenant::Tenant;

use crate::codec;
use crate::error::StorageError;

struct Wrapper(Tenant);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let config: String = row.try_get("config")?;
        Ok(Self(Tenant {
            id: codec::decode_parsed(&id)?,
            name: row.try_get("name")?,
            config: codec::decode_json(&config)?,
        }))
    }
}

/// `SQLite`-backed tenant repository.
pub struct SqliteTenantRepository {
    pool: SqlitePool,
}

impl SqliteTenantRepository {
    /// Create a new repository backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or replace a tenant record.
    ///
    /// Tenants are provisioned outside the automation engine; this is the
    /// entry point for that provisioning and for fixtures.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the write fails.
    pub async fn create(&self, tenant: Tenant) -> Result<Tenant, SchoolHubError> {
        let config = serde_json::to_string(&tenant.config).map_err(StorageError::from)?;
        sqlx::query(
            "INSERT INTO tenants (id, name, config, created_at) VALUES (?, ?, ?, ?)
             ON CONFLICT (id) DO UPDATE SET name = excluded.name, config = excluded.config",
        )
        .bind(tenant.id.to_string())
        .bind(&tenant.name)
        .bind(&config)
        .bind(codec::encode_timestamp(schoolhub_domain::time::now()))
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;
        Ok(tenant)
    }
}

impl TenantRepository for SqliteTenantRepository {
    async fn get_by_id(&self, id: TenantId) -> Result<Option<Tenant>, SchoolHubError> {
        let row: Option<Wrapper> = sqlx::query_as("SELECT * FROM tenants WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(row.map(|w| w.0))
    }
}
