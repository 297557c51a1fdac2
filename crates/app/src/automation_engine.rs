//! Automation engine — reacts to events by evaluating and executing rules.
//!
//! For each handled event, the engine loads the tenant's active rules
//! subscribed to the event type, evaluates each rule's condition against the
//! event payload and, on a match, hands the rule's actions to the
//! [`ActionExecutor`]. Rules are independent: a failing action of one rule
//! never affects the evaluation of the next.

use serde_json::Value;

use schoolhub_domain::condition::Evaluation;
use schoolhub_domain::error::SchoolHubError;
use schoolhub_domain::id::{RuleId, TenantId};

use crate::action_executor::ActionExecutor;
use crate::ports::{OutboxWriter, RuleRepository, WebhookClient};

/// Event-driven rule engine.
pub struct AutomationEngine<R, O, W> {
    rules: R,
    executor: ActionExecutor<O, W>,
}

impl<R, O, W> AutomationEngine<R, O, W>
where
    R: RuleRepository + Send + Sync,
    O: OutboxWriter + Send + Sync,
    W: WebhookClient + Send + Sync,
{
    /// Create a new engine.
    pub fn new(rules: R, executor: ActionExecutor<O, W>) -> Self {
        Self { rules, executor }
    }

    /// Process one event of `event_type` for `tenant_id`.
    ///
    /// Returns the ids of the rules whose condition matched and whose
    /// actions were run, in store order.
    ///
    /// # Errors
    ///
    /// Returns a storage error if loading the rules fails. Action failures
    /// are logged and never returned.
    #[tracing::instrument(skip_all, fields(tenant_id = %tenant_id, event_type = %event_type))]
    pub async fn handle_event(
        &self,
        tenant_id: TenantId,
        event_type: &str,
        payload: &Value,
    ) -> Result<Vec<RuleId>, SchoolHubError> {
        let rules = self
            .rules
            .list_active_for_event(tenant_id, event_type)
            .await?;
        let mut fired = Vec::new();

        for rule in &rules {
            match rule.parsed_condition().diagnose(payload) {
                Evaluation::Matched => {}
                Evaluation::NotMatched => continue,
                Evaluation::Malformed(reason) => {
                    tracing::warn!(rule_id = %rule.id, %reason, "malformed condition, rule skipped");
                    continue;
                }
            }

            let report = self
                .executor
                .execute(rule.tenant_id, &rule.actions, payload)
                .await;
            if report.is_clean() {
                tracing::info!(rule_id = %rule.id, actions = report.succeeded, "rule fired");
            } else {
                tracing::warn!(
                    rule_id = %rule.id,
                    succeeded = report.succeeded,
                    failed = report.failed,
                    "rule fired with failed actions"
                );
            }
            fired.push(rule.id);
        }

        Ok(fired)
    }
}
