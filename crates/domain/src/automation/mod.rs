//! Automation rules — trigger → condition → action.
//!
//! A tenant defines rules that fire either when an event of a given type is
//! handled ([`TriggerType::Event`]) or when a cron schedule matches the
//! tenant-local minute ([`TriggerType::Time`]). When the rule's condition
//! holds for the trigger payload, its actions run in order.
//!
//! Definitions enter the system through [`RuleDraft::normalize_and_validate`];
//! once persisted, rules are read-only to the engine and scheduler.

mod action;
mod trigger;
mod validate;

pub use action::{
    Action, ActionSpec, DelayOutOfRange, EmitEventConfig, NOTIFICATION_DISPATCH_EVENT, NotificationConfig,
    WebhookConfig,
};
pub use trigger::{TIME_SCHEDULE_EVENT, TriggerType};
pub use validate::{NormalizedRule, RuleDraft};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::condition::Condition;
use crate::cron::{CronError, CronExpression};
use crate::id::{RuleId, TenantId, UserId};
use crate::time::Timestamp;

/// A tenant-scoped automation rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomationRule {
    pub id: RuleId,
    pub tenant_id: TenantId,
    pub name: String,
    pub description: String,
    pub trigger_type: TriggerType,
    /// Subscribed event type, or [`TIME_SCHEDULE_EVENT`] for time rules.
    pub trigger_event: String,
    pub schedule_cron: Option<String>,
    /// Raw condition tree; `{}` means always.
    pub condition: Value,
    /// Raw list of `{type, config}` descriptors.
    pub actions: Value,
    pub is_active: bool,
    pub created_by: Option<UserId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl AutomationRule {
    /// Create a rule for `tenant_id` from a validated definition.
    #[must_use]
    pub fn from_normalized(
        tenant_id: TenantId,
        rule: NormalizedRule,
        created_by: Option<UserId>,
        now: Timestamp,
    ) -> Self {
        Self {
            id: RuleId::new(),
            tenant_id,
            name: rule.name,
            description: rule.description,
            trigger_type: rule.trigger_type,
            trigger_event: rule.trigger_event,
            schedule_cron: rule.schedule_cron,
            condition: rule.condition,
            actions: rule.actions,
            is_active: rule.is_active,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the editable fields with a validated definition.
    pub fn apply(&mut self, rule: NormalizedRule, now: Timestamp) {
        self.name = rule.name;
        self.description = rule.description;
        self.trigger_type = rule.trigger_type;
        self.trigger_event = rule.trigger_event;
        self.schedule_cron = rule.schedule_cron;
        self.condition = rule.condition;
        self.actions = rule.actions;
        self.is_active = rule.is_active;
        self.updated_at = now;
    }

    /// Parsed condition tree.
    #[must_use]
    pub fn parsed_condition(&self) -> Condition {
        Condition::parse(&self.condition)
    }

    /// Parsed schedule, `None` when the rule has no (non-blank) cron.
    #[must_use]
    pub fn schedule(&self) -> Option<Result<CronExpression, CronError>> {
        self.schedule_cron
            .as_deref()
            .map(str::trim)
            .filter(|expr| !expr.is_empty())
            .map(CronExpression::parse)
    }

    /// Decoded action descriptors.
    ///
    /// # Errors
    ///
    /// Returns an error when the stored actions are neither a list nor a
    /// single descriptor.
    pub fn action_specs(&self) -> Result<Vec<ActionSpec>, serde_json::Error> {
        ActionSpec::list_from_value(&self.actions)
    }
}
