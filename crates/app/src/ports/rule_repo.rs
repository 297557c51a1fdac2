//! Rule repository port — persistence for automation rules.

use std::future::Future;
use std::sync::Arc;

use schoolhub_domain::automation::AutomationRule;
use schoolhub_domain::error::SchoolHubError;
use schoolhub_domain::id::{RuleId, TenantId};

/// Repository for persisting and querying [`AutomationRule`]s.
///
/// Every lookup except [`list_active_time_rules`](Self::list_active_time_rules)
/// is scoped to a single tenant.
pub trait RuleRepository {
    /// Persist a new rule.
    fn create(
        &self,
        rule: AutomationRule,
    ) -> impl Future<Output = Result<AutomationRule, SchoolHubError>> + Send;

    /// Get a tenant's rule by id.
    fn get_by_id(
        &self,
        tenant_id: TenantId,
        id: RuleId,
    ) -> impl Future<Output = Result<Option<AutomationRule>, SchoolHubError>> + Send;

    /// All rules of a tenant, active or not.
    fn list_for_tenant(
        &self,
        tenant_id: TenantId,
    ) -> impl Future<Output = Result<Vec<AutomationRule>, SchoolHubError>> + Send;

    /// Active rules of a tenant subscribed to `event_type`.
    fn list_active_for_event(
        &self,
        tenant_id: TenantId,
        event_type: &str,
    ) -> impl Future<Output = Result<Vec<AutomationRule>, SchoolHubError>> + Send;

    /// Active time-triggered rules across all tenants.
    fn list_active_time_rules(
        &self,
    ) -> impl Future<Output = Result<Vec<AutomationRule>, SchoolHubError>> + Send;

    /// Overwrite an existing rule.
    fn update(
        &self,
        rule: AutomationRule,
    ) -> impl Future<Output = Result<AutomationRule, SchoolHubError>> + Send;

    /// Delete a tenant's rule. Returns `false` when nothing was deleted.
    fn delete(
        &self,
        tenant_id: TenantId,
        id: RuleId,
    ) -> impl Future<Output = Result<bool, SchoolHubError>> + Send;
}

impl<T: RuleRepository + Send + Sync> RuleRepository for Arc<T> {
    fn create(
        &self,
        rule: AutomationRule,
    ) -> impl Future<Output = Result<AutomationRule, SchoolHubError>> + Send {
        (**self).create(rule)
    }

    fn get_by_id(
        &self,
        tenant_id: TenantId,
        id: RuleId,
    ) -> impl Future<Output = Result<Option<AutomationRule>, SchoolHubError>> + Send {
        (**self).get_by_id(tenant_id, id)
    }

    fn list_for_tenant(
        &self,
        tenant_id: TenantId,
    ) -> impl Future<Output = Result<Vec<AutomationRule>, SchoolHubError>> + Send {
        (**self).list_for_tenant(tenant_id)
    }

    fn list_active_for_event(
        &self,
        tenant_id: TenantId,
        event_type: &str,
    ) -> impl Future<Output = Result<Vec<AutomationRule>, SchoolHubError>> + Send {
        (**self).list_active_for_event(tenant_id, event_type)
    }

    fn list_active_time_rules(
        &self,
    ) -> impl Future<Output = Result<Vec<AutomationRule>, SchoolHubError>> + Send {
        (**self).list_active_time_rules()
    }

    fn update(
        &self,
        rule: AutomationRule,
    ) -> impl Future<Output = Result<AutomationRule, SchoolHubError>> + Send {
        (**self).update(rule)
    }

    fn delete(
        &self,
        tenant_id: TenantId,
        id: RuleId,
    ) -> impl Future<Output = Result<bool, SchoolHubError>> + Send {
        (**self).delete(tenant_id, id)
    }
}
