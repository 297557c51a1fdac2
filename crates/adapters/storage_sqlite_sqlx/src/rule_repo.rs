//! `SQLite` implementation of [`RuleRepository`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use schoolhub_app::ports::RuleRepository;
use schoolhub_domain::automation::{AutomationRule, TriggerType};
use schoolhub_domain::error::SchoolHubError;
use schoolhub_domain::id::{RuleId, TenantId};

use crate::codec;
use crate::error::StorageError;

struct Wrapper(AutomationRule);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let tenant_id: String = row.try_get("tenant_id")?;
        let trigger_type: String = row.try_get("trigger_type")?;
        let condition: String = row.try_get("condition")?;
        let actions: String = row.try_get("actions")?;
        let created_by: Option<String> = row.try_get("created_by")?;
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;

        let trigger_type = trigger_type
            .parse::<TriggerType>()
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(AutomationRule {
            id: codec::decode_parsed(&id)?,
            tenant_id: codec::decode_parsed(&tenant_id)?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            trigger_type,
            trigger_event: row.try_get("trigger_event")?,
            schedule_cron: row.try_get("schedule_cron")?,
            condition: codec::decode_json(&condition)?,
            actions: codec::decode_json(&actions)?,
            is_active: row.try_get("is_active")?,
            created_by: created_by
                .as_deref()
                .map(codec::decode_parsed)
                .transpose()?,
            created_at: codec::decode_timestamp(&created_at)?,
            updated_at: codec::decode_timestamp(&updated_at)?,
        }))
    }
}

fn unwrap_all(rows: Vec<Wrapper>) -> Vec<AutomationRule> {
    rows.into_iter().map(|w| w.0).collect()
}

/// `SQLite`-backed rule repository.
pub struct SqliteRuleRepository {
    pool: SqlitePool,
}

impl SqliteRuleRepository {
    /// Create a new repository backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl RuleRepository for SqliteRuleRepository {
    async fn create(&self, rule: AutomationRule) -> Result<AutomationRule, SchoolHubError> {
        let condition = serde_json::to_string(&rule.condition).map_err(StorageError::from)?;
        let actions = serde_json::to_string(&rule.actions).map_err(StorageError::from)?;

        sqlx::query(
            "INSERT INTO automation_rules (id, tenant_id, name, description, trigger_type, trigger_event, schedule_cron, condition, actions, is_active, created_by, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(rule.id.to_string())
        .bind(rule.tenant_id.to_string())
        .bind(&rule.name)
        .bind(&rule.description)
        .bind(rule.trigger_type.as_str())
        .bind(&rule.trigger_event)
        .bind(&rule.schedule_cron)
        .bind(&condition)
        .bind(&actions)
        .bind(rule.is_active)
        .bind(rule.created_by.map(|u| u.to_string()))
        .bind(codec::encode_timestamp(rule.created_at))
        .bind(codec::encode_timestamp(rule.updated_at))
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;

        Ok(rule)
    }

    async fn get_by_id(
        &self,
        tenant_id: TenantId,
        id: RuleId,
    ) -> Result<Option<AutomationRule>, SchoolHubError> {
        let row: Option<Wrapper> =
            sqlx::query_as("SELECT * FROM automation_rules WHERE tenant_id = ? AND id = ?")
                .bind(tenant_id.to_string())
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(StorageError::from)?;
        Ok(row.map(|w| w.0))
    }

    async fn list_for_tenant(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<AutomationRule>, SchoolHubError> {
        let rows: Vec<Wrapper> = sqlx::query_as(
            "SELECT * FROM automation_rules WHERE tenant_id = ? ORDER BY created_at, id",
        )
        .bind(tenant_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::from)?;
        Ok(unwrap_all(rows))
    }

    async fn list_active_for_event(
        &self,
        tenant_id: TenantId,
        event_type: &str,
    ) -> Result<Vec<AutomationRule>, SchoolHubError> {
        let rows: Vec<Wrapper> = sqlx::query_as(
            "SELECT * FROM automation_rules WHERE tenant_id = ? AND trigger_event = ? AND is_active = 1 ORDER BY created_at, id",
        )
        .bind(tenant_id.to_string())
        .bind(event_type)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::from)?;
        Ok(unwrap_all(rows))
    }

    async fn list_active_time_rules(&self) -> Result<Vec<AutomationRule>, SchoolHubError> {
        let rows: Vec<Wrapper> = sqlx::query_as(
            "SELECT * FROM automation_rules WHERE trigger_type = 'time' AND is_active = 1 ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::from)?;
        Ok(unwrap_all(rows))
    }

    async fn update(&self, rule: AutomationRule) -> Result<AutomationRule, SchoolHubError> {
        let condition = serde_json::to_string(&rule.condition).map_err(StorageError::from)?;
        let actions = serde_json::to_string(&rule.actions).map_err(StorageError::from)?;

        let result = sqlx::query(
            "UPDATE automation_rules SET name = ?, description = ?, trigger_type = ?, trigger_event = ?, schedule_cron = ?, condition = ?, actions = ?, is_active = ?, updated_at = ? WHERE tenant_id = ? AND id = ?",
        )
        .bind(&rule.name)
        .bind(&rule.description)
        .bind(rule.trigger_type.as_str())
        .bind(&rule.trigger_event)
        .bind(&rule.schedule_cron)
        .bind(&condition)
        .bind(&actions)
        .bind(rule.is_active)
        .bind(codec::encode_timestamp(rule.updated_at))
        .bind(rule.tenant_id.to_string())
        .bind(rule.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;

        if result.rows_affected() == 0 {
            return Err(schoolhub_domain::error::NotFoundError {
                entity: "AutomationRule",
                id: rule.id.to_string(),
            }
            .into());
        }
        Ok(rule)
    }

    async fn delete(&self, tenant_id: TenantId, id: RuleId) -> Result<bool, SchoolHubError> {
        let result = sqlx::query("DELETE FROM automation_rules WHERE tenant_id = ? AND id = ?")
            .bind(tenant_id.to_string())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(result.rows_affected() > 0)
    }
}
