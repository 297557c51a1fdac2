//! Rule service — use-cases for managing a tenant's automation rules.

use schoolhub_domain::automation::{AutomationRule, RuleDraft};
use schoolhub_domain::error::{NotFoundError, SchoolHubError};
use schoolhub_domain::id::{RuleId, TenantId, UserId};

use crate::ports::RuleRepository;

/// Application service for tenant-scoped rule CRUD.
///
/// Every write goes through [`RuleDraft::normalize_and_validate`], so the
/// engine and scheduler only ever see valid definitions.
pub struct RuleService<R> {
    repo: R,
}

impl<R: RuleRepository + Send + Sync> RuleService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validate and persist a new rule for `tenant_id`.
    ///
    /// # Errors
    ///
    /// Returns [`SchoolHubError::Validation`] if the draft is invalid, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, draft), fields(rule_name = %draft.name))]
    pub async fn create_rule(
        &self,
        tenant_id: TenantId,
        draft: RuleDraft,
        created_by: Option<UserId>,
    ) -> Result<AutomationRule, SchoolHubError> {
        let normalized = draft.normalize_and_validate()?;
        let rule = AutomationRule::from_normalized(
            tenant_id,
            normalized,
            created_by,
            schoolhub_domain::time::now(),
        );
        self.repo.create(rule).await
    }

    /// Replace the definition of an existing rule.
    ///
    /// # Errors
    ///
    /// Returns [`SchoolHubError::Validation`] if the draft is invalid,
    /// [`SchoolHubError::NotFound`] if the tenant has no such rule, or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self, draft))]
    pub async fn update_rule(
        &self,
        tenant_id: TenantId,
        id: RuleId,
        draft: RuleDraft,
    ) -> Result<AutomationRule, SchoolHubError> {
        let normalized = draft.normalize_and_validate()?;
        let mut rule = self.get_rule(tenant_id, id).await?;
        rule.apply(normalized, schoolhub_domain::time::now());
        self.repo.update(rule).await
    }

    /// Look up a tenant's rule by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`SchoolHubError::NotFound`] when the tenant has no rule with
    /// `id`, or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_rule(
        &self,
        tenant_id: TenantId,
        id: RuleId,
    ) -> Result<AutomationRule, SchoolHubError> {
        self.repo
            .get_by_id(tenant_id, id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// List all rules of a tenant.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_rules(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<AutomationRule>, SchoolHubError> {
        self.repo.list_for_tenant(tenant_id).await
    }

    /// Delete a tenant's rule.
    ///
    /// # Errors
    ///
    /// Returns [`SchoolHubError::NotFound`] when nothing was deleted, or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete_rule(&self, tenant_id: TenantId, id: RuleId) -> Result<(), SchoolHubError> {
        if self.repo.delete(tenant_id, id).await? {
            Ok(())
        } else {
            Err(not_found(id))
        }
    }
}

fn not_found(id: RuleId) -> SchoolHubError {
    NotFoundError {
        entity: "AutomationRule",
        id: id.to_string(),
    }
    .into()
}
