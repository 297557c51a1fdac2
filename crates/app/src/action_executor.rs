//! Action executor — performs a fired rule's actions in order.
//!
//! Outbox-backed actions (`send_notification`, `emit_event`) only append a
//! record; delivery belongs to the outbox consumer. Webhooks are called
//! inline through the [`WebhookClient`] port. A failing action never stops
//! the ones after it and never surfaces as an error to the caller.

use serde_json::Value;

use schoolhub_domain::automation::{
    Action, ActionSpec, DelayOutOfRange, EmitEventConfig, NotificationConfig,
};
use schoolhub_domain::error::SchoolHubError;
use schoolhub_domain::id::TenantId;
use schoolhub_domain::outbox::NewOutboxEvent;

use crate::ports::{OutboxWriter, WebhookClient};

/// Outcome counts of one [`ActionExecutor::execute`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    pub succeeded: usize,
    pub failed: usize,
    /// Unknown action types.
    pub skipped: usize,
}

impl ExecutionReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

enum Outcome {
    Done,
    Skipped,
}

/// Dispatches action descriptors to the outbox and webhook ports.
pub struct ActionExecutor<O, W> {
    outbox: O,
    webhook: W,
}

impl<O, W> ActionExecutor<O, W>
where
    O: OutboxWriter + Send + Sync,
    W: WebhookClient + Send + Sync,
{
    pub fn new(outbox: O, webhook: W) -> Self {
        Self { outbox, webhook }
    }

    /// Run `actions` for `tenant_id` with the trigger `payload`.
    ///
    /// `actions` is a list of `{type, config}` descriptors or a single one.
    #[tracing::instrument(skip_all, fields(tenant_id = %tenant_id))]
    pub async fn execute(
        &self,
        tenant_id: TenantId,
        actions: &Value,
        payload: &Value,
    ) -> ExecutionReport {
        let mut report = ExecutionReport::default();

        let specs = match ActionSpec::list_from_value(actions) {
            Ok(specs) => specs,
            Err(err) => {
                tracing::warn!(error = %err, "undecodable action list");
                report.failed += 1;
                return report;
            }
        };

        for (index, spec) in specs.iter().enumerate() {
            let action_type = spec.kind();
            match self.run_one(tenant_id, spec, payload).await {
                Ok(Outcome::Done) => report.succeeded += 1,
                Ok(Outcome::Skipped) => {
                    tracing::warn!(index, action_type = %action_type, "unknown action type ignored");
                    report.skipped += 1;
                }
                Err(err) => {
                    tracing::warn!(index, action_type = %action_type, error = %err, "action failed");
                    report.failed += 1;
                }
            }
        }

        report
    }

    async fn run_one(
        &self,
        tenant_id: TenantId,
        spec: &ActionSpec,
        payload: &Value,
    ) -> Result<Outcome, ActionFailure> {
        match spec.resolve().map_err(ActionFailure::Config)? {
            Action::SendNotification(cfg) => {
                self.send_notification(tenant_id, &cfg, payload).await?;
            }
            Action::Webhook(cfg) => {
                let url = cfg.url.trim();
                if url.is_empty() {
                    return Err(ActionFailure::MissingField("url"));
                }
                self.webhook.post_json(url, payload).await?;
                tracing::debug!(url, "webhook delivered");
            }
            Action::EmitEvent(cfg) => {
                self.emit_event(tenant_id, &cfg, payload).await?;
            }
            Action::Unknown(_) => return Ok(Outcome::Skipped),
        }
        Ok(Outcome::Done)
    }

    async fn send_notification(
        &self,
        tenant_id: TenantId,
        cfg: &NotificationConfig,
        payload: &Value,
    ) -> Result<(), ActionFailure> {
        let now = schoolhub_domain::time::now();
        let event = self
            .outbox
            .create_outbox_event(NewOutboxEvent {
                tenant_id,
                event_type: cfg.event_type().to_string(),
                payload: cfg.outbox_payload(payload, now),
                process_after: now,
            })
            .await?;
        tracing::debug!(outbox_id = %event.id, event_type = %event.event_type, "notification queued");
        Ok(())
    }

    async fn emit_event(
        &self,
        tenant_id: TenantId,
        cfg: &EmitEventConfig,
        payload: &Value,
    ) -> Result<(), ActionFailure> {
        let event_type = cfg.event_type.trim();
        if event_type.is_empty() {
            return Err(ActionFailure::MissingField("event_type"));
        }
        let now = schoolhub_domain::time::now();
        let process_after = cfg.process_after(now)?;
        let event = self
            .outbox
            .create_outbox_event(NewOutboxEvent {
                tenant_id,
                event_type: event_type.to_string(),
                payload: cfg.build_payload(payload, now),
                process_after,
            })
            .await?;
        tracing::debug!(outbox_id = %event.id, event_type, "event emitted");
        Ok(())
    }
}

/// Why a single action did not complete.
#[derive(Debug, thiserror::Error)]
enum ActionFailure {
    #[error("invalid action config")]
    Config(#[source] serde_json::Error),

    #[error("config.{0} is required")]
    MissingField(&'static str),

    #[error(transparent)]
    Delay(#[from] DelayOutOfRange),

    #[error(transparent)]
    Port(#[from] SchoolHubError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingOutbox, RecordingWebhook};
    use schoolhub_domain::automation::NOTIFICATION_DISPATCH_EVENT;
    use serde_json::json;
    use std::sync::Arc;

    fn executor() -> (
        ActionExecutor<Arc<RecordingOutbox>, Arc<RecordingWebhook>>,
        Arc<RecordingOutbox>,
        Arc<RecordingWebhook>,
    ) {
        let outbox = Arc::new(RecordingOutbox::default());
        let webhook = Arc::new(RecordingWebhook::default());
        (
            ActionExecutor::new(Arc::clone(&outbox), Arc::clone(&webhook)),
            outbox,
            webhook,
        )
    }

    #[tokio::test]
    async fn should_queue_notification_with_trigger_payload() {
        let (exec, outbox, _) = executor();
        let tenant = TenantId::new();
        let report = exec
            .execute(
                tenant,
                &json!([{"type": "send_notification", "config": {"channel": "sms", "template_code": "ABSENT"}}]),
                &json!({"student_id": "S-7"}),
            )
            .await;

        assert_eq!(report.succeeded, 1);
        let events = outbox.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].tenant_id, tenant);
        assert_eq!(events[0].event_type, NOTIFICATION_DISPATCH_EVENT);
        assert_eq!(events[0].payload["channels"], json!(["sms"]));
        assert_eq!(events[0].payload["event_payload"]["student_id"], "S-7");
    }

    #[tokio::test]
    async fn should_continue_after_failed_webhook_when_actions_are_independent() {
        let (exec, outbox, webhook) = executor();
        let report = exec
            .execute(
                TenantId::new(),
                &json!([
                    {"type": "webhook", "config": {"url": "http://unreachable.invalid/hook"}},
                    {"type": "send_notification", "config": {"channel": "email"}}
                ]),
                &json!({"incident_id": "INC-9"}),
            )
            .await;

        assert_eq!(report.failed, 1);
        assert_eq!(report.succeeded, 1);
        assert_eq!(webhook.calls().len(), 1);
        assert_eq!(outbox.events().len(), 1);
    }

    #[tokio::test]
    async fn should_post_trigger_payload_to_webhook() {
        let (exec, outbox, webhook) = executor();
        let payload = json!({"incident_id": "INC-1"});
        let report = exec
            .execute(
                TenantId::new(),
                &json!({"type": "webhook", "config": {"url": " https://hooks.school.test/a "}}),
                &payload,
            )
            .await;

        assert!(report.is_clean());
        assert_eq!(
            webhook.calls(),
            vec![("https://hooks.school.test/a".to_string(), payload)]
        );
        assert!(outbox.events().is_empty());
    }

    #[tokio::test]
    async fn should_fail_webhook_when_url_is_missing() {
        let (exec, _, webhook) = executor();
        let report = exec
            .execute(TenantId::new(), &json!([{"type": "webhook"}]), &json!({}))
            .await;
        assert_eq!(report.failed, 1);
        assert!(webhook.calls().is_empty());
    }

    #[tokio::test]
    async fn should_emit_merged_event_with_delay() {
        let (exec, outbox, _) = executor();
        let report = exec
            .execute(
                TenantId::new(),
                &json!([{"type": "outbox_event", "config": {
                    "event_type": "automation.custom.alert",
                    "payload": {"source": "rule"},
                    "merge_trigger_payload": true,
                    "process_after_seconds": 120
                }}]),
                &json!({"incident_id": "INC-42"}),
            )
            .await;

        assert_eq!(report.succeeded, 1);
        let events = outbox.events();
        assert_eq!(events[0].event_type, "automation.custom.alert");
        assert_eq!(events[0].payload["incident_id"], "INC-42");
        assert_eq!(events[0].payload["source"], "rule");
        assert!(events[0].process_after > events[0].created_at);
    }

    #[tokio::test]
    async fn should_fail_emit_event_when_event_type_is_blank() {
        let (exec, outbox, _) = executor();
        let report = exec
            .execute(
                TenantId::new(),
                &json!([{"type": "emit_event", "config": {"event_type": "  "}}]),
                &json!({}),
            )
            .await;
        assert_eq!(report.failed, 1);
        assert!(outbox.events().is_empty());
    }

    #[tokio::test]
    async fn should_continue_after_emit_event_with_out_of_range_delay() {
        let (exec, outbox, _) = executor();
        let report = exec
            .execute(
                TenantId::new(),
                &json!([
                    {"type": "emit_event", "config": {
                        "event_type": "automation.custom.later",
                        "process_after_seconds": i64::MAX
                    }},
                    {"type": "send_notification", "config": {"channel": "sms"}}
                ]),
                &json!({}),
            )
            .await;

        assert_eq!(report.failed, 1);
        assert_eq!(report.succeeded, 1);
        let events = outbox.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, NOTIFICATION_DISPATCH_EVENT);
    }

    #[tokio::test]
    async fn should_skip_unknown_action_type_without_failing() {
        let (exec, outbox, _) = executor();
        let report = exec
            .execute(
                TenantId::new(),
                &json!([
                    {"type": "fax", "config": {}},
                    {"type": "send_notification"}
                ]),
                &Value::Null,
            )
            .await;
        assert_eq!(
            report,
            ExecutionReport {
                succeeded: 1,
                failed: 0,
                skipped: 1
            }
        );
        assert_eq!(outbox.events().len(), 1);
    }

    #[tokio::test]
    async fn should_report_failure_when_action_list_is_undecodable() {
        let (exec, outbox, _) = executor();
        let report = exec
            .execute(TenantId::new(), &json!("send_notification"), &json!({}))
            .await;
        assert_eq!(report.failed, 1);
        assert!(outbox.events().is_empty());
    }
}
