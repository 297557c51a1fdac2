//! `SQLite` implementation of [`RunClaimStore`].
//!
//! A claim is a row in `automation_rule_runs`; the `(rule_id, run_minute)`
//! unique key makes the insert succeed for exactly one caller.

use sqlx::SqlitePool;

use schoolhub_app::ports::RunClaimStore;
use schoolhub_domain::error::SchoolHubError;
use schoolhub_domain::id::RuleId;
use schoolhub_domain::time::{Timestamp, truncate_to_minute};

use crate::codec;
use crate::error::StorageError;

/// `SQLite`-backed run claims.
pub struct SqliteRunClaimStore {
    pool: SqlitePool,
}

impl SqliteRunClaimStore {
    /// Create a new store backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl RunClaimStore for SqliteRunClaimStore {
    async fn try_claim(
        &self,
        rule_id: RuleId,
        run_minute: Timestamp,
    ) -> Result<bool, SchoolHubError> {
        let result = sqlx::query(
            "INSERT INTO automation_rule_runs (rule_id, run_minute, claimed_at) VALUES (?, ?, ?)
             ON CONFLICT (rule_id, run_minute) DO NOTHING",
        )
        .bind(rule_id.to_string())
        .bind(codec::encode_minute(truncate_to_minute(run_minute)))
        .bind(codec::encode_timestamp(schoolhub_domain::time::now()))
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;

        Ok(result.rows_affected() == 1)
    }
}
