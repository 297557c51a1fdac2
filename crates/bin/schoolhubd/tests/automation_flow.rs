//! End-to-end tests for the full schoolhubd stack.
//!
//! Each test wires the real `SQLite` adapters (in-memory database), the real
//! webhook client and the application services exactly like the daemon does.

use std::time::Duration;

use chrono::TimeZone;
use schoolhub_adapter_storage_sqlite_sqlx::{Config, Database};
use schoolhub_domain::automation::{NOTIFICATION_DISPATCH_EVENT, RuleDraft};
use schoolhub_domain::error::{SchoolHubError, ValidationError};
use schoolhub_domain::id::TenantId;
use schoolhub_domain::tenant::Tenant;
use schoolhub_domain::time::Timestamp;
use schoolhubd::wiring::Services;
use serde_json::json;

async fn database() -> Database {
    Config {
        database_url: "sqlite::memory:".to_string(),
    }
    .build()
    .await
    .expect("in-memory database should initialise")
}

fn services(db: &Database) -> Services {
    let webhooks = schoolhub_adapter_webhook_reqwest::Config {
        timeout: Duration::from_secs(2),
        ..schoolhub_adapter_webhook_reqwest::Config::default()
    }
    .build()
    .expect("webhook client should build");
    Services::new(db.pool(), webhooks)
}

async fn tenant(services: &Services, timezone: &str) -> TenantId {
    let tenant = Tenant {
        id: TenantId::new(),
        name: "Greenfield International School".to_string(),
        config: json!({ "timezone": timezone }),
    };
    services.tenants.create(tenant).await.unwrap().id
}

/// Friday 2026-02-20, 09:30 in Asia/Kolkata.
fn friday_morning_ist() -> Timestamp {
    chrono::Utc.with_ymd_and_hms(2026, 2, 20, 4, 0, 0).unwrap()
}

// ---------------------------------------------------------------------------
// Event-triggered rules
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_write_notification_and_chained_event_when_event_matches() {
    let db = database().await;
    let app = services(&db);
    let tenant_id = tenant(&app, "UTC").await;

    app.rules
        .create_rule(
            tenant_id,
            RuleDraft {
                name: "Escalate high severity incidents".to_string(),
                trigger_event: "incident.reported".to_string(),
                condition_json: r#"{"all":[{"field":"severity","op":"eq","value":"high"}]}"#
                    .to_string(),
                action_json: r#"[
                    {"type":"send_notification","config":{"channel":"email","template_code":"INCIDENT_HIGH"}},
                    {"type":"emit_event","config":{"event_type":"automation.custom.alert","merge_trigger_payload":true}}
                ]"#
                .to_string(),
                ..RuleDraft::default()
            },
            None,
        )
        .await
        .unwrap();

    let fired = app
        .engine
        .handle_event(
            tenant_id,
            "incident.reported",
            &json!({"severity": "high", "incident_id": "INC-2026-001"}),
        )
        .await
        .unwrap();

    assert_eq!(fired.len(), 1);
    let events = app.outbox.list_for_tenant(tenant_id).await.unwrap();
    assert_eq!(events.len(), 2);
    let notification = events
        .iter()
        .find(|e| e.event_type == NOTIFICATION_DISPATCH_EVENT)
        .expect("notification queued");
    assert_eq!(notification.payload["template_code"], "INCIDENT_HIGH");
    let chained = events
        .iter()
        .find(|e| e.event_type == "automation.custom.alert")
        .expect("chained event emitted");
    assert_eq!(chained.payload["incident_id"], "INC-2026-001");
}

#[tokio::test]
async fn should_write_nothing_when_condition_does_not_match() {
    let db = database().await;
    let app = services(&db);
    let tenant_id = tenant(&app, "UTC").await;

    app.rules
        .create_rule(
            tenant_id,
            RuleDraft {
                name: "High severity only".to_string(),
                trigger_event: "incident.reported".to_string(),
                condition_json: r#"{"severity":"high"}"#.to_string(),
                action_json: r#"{"type":"send_notification","config":{"channel":"sms"}}"#
                    .to_string(),
                ..RuleDraft::default()
            },
            None,
        )
        .await
        .unwrap();

    app.engine
        .handle_event(tenant_id, "incident.reported", &json!({"severity": "low"}))
        .await
        .unwrap();

    assert!(app.outbox.list_for_tenant(tenant_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn should_run_notification_after_unreachable_webhook() {
    let db = database().await;
    let app = services(&db);
    let tenant_id = tenant(&app, "UTC").await;

    app.rules
        .create_rule(
            tenant_id,
            RuleDraft {
                name: "Webhook then notify".to_string(),
                trigger_event: "fees.overdue".to_string(),
                action_json: r#"[
                    {"type":"webhook","config":{"url":"http://127.0.0.1:1/hook"}},
                    {"type":"send_notification","config":{"channel":"sms"}}
                ]"#
                .to_string(),
                ..RuleDraft::default()
            },
            None,
        )
        .await
        .unwrap();

    app.engine
        .handle_event(tenant_id, "fees.overdue", &json!({"invoice": "F-77"}))
        .await
        .unwrap();

    let events = app.outbox.list_for_tenant(tenant_id).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, NOTIFICATION_DISPATCH_EVENT);
    assert_eq!(events[0].payload["event_payload"]["invoice"], "F-77");
}

// ---------------------------------------------------------------------------
// Time-triggered rules
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_fire_scheduled_rule_once_across_two_schedulers() {
    let db = database().await;
    let first = services(&db);
    let second = services(&db);
    let tenant_id = tenant(&first, "Asia/Kolkata").await;

    first
        .rules
        .create_rule(
            tenant_id,
            RuleDraft {
                name: "Friday assembly".to_string(),
                trigger_type: "time".to_string(),
                schedule_cron: "30 9 * * fri".to_string(),
                action_json: r#"[{"type":"emit_event","config":{"event_type":"automation.scheduler.fired","payload":{"kind":"assembly"}}}]"#
                    .to_string(),
                ..RuleDraft::default()
            },
            None,
        )
        .await
        .unwrap();

    let a = first.scheduler.tick_at(friday_morning_ist()).await.unwrap();
    let b = second.scheduler.tick_at(friday_morning_ist()).await.unwrap();

    assert_eq!((a.due, b.due), (1, 1));
    assert_eq!(a.fired + b.fired, 1);
    let events = first.outbox.list_for_tenant(tenant_id).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, "automation.scheduler.fired");
    assert_eq!(events[0].payload["kind"], "assembly");
}

#[tokio::test]
async fn should_not_fire_scheduled_rule_outside_tenant_minute() {
    let db = database().await;
    let app = services(&db);
    let tenant_id = tenant(&app, "Asia/Kolkata").await;

    app.rules
        .create_rule(
            tenant_id,
            RuleDraft {
                name: "Friday assembly".to_string(),
                trigger_type: "time".to_string(),
                schedule_cron: "30 9 * * fri".to_string(),
                action_json: r#"{"type":"send_notification","config":{"channel":"sms"}}"#
                    .to_string(),
                ..RuleDraft::default()
            },
            None,
        )
        .await
        .unwrap();

    let next_minute = friday_morning_ist() + chrono::TimeDelta::minutes(1);
    let summary = app.scheduler.tick_at(next_minute).await.unwrap();

    assert_eq!(summary.fired, 0);
    assert!(app.outbox.list_for_tenant(tenant_id).await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Rule management
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_reject_time_rule_without_schedule() {
    let db = database().await;
    let app = services(&db);
    let tenant_id = tenant(&app, "UTC").await;

    let result = app
        .rules
        .create_rule(
            tenant_id,
            RuleDraft {
                name: "Broken".to_string(),
                trigger_type: "time".to_string(),
                action_json: r#"[{"type":"send_notification"}]"#.to_string(),
                ..RuleDraft::default()
            },
            None,
        )
        .await;

    assert!(matches!(
        result,
        Err(SchoolHubError::Validation(ValidationError::MissingSchedule))
    ));
    assert!(app.rules.list_rules(tenant_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn should_stop_firing_after_rule_is_deactivated() {
    let db = database().await;
    let app = services(&db);
    let tenant_id = tenant(&app, "UTC").await;
    let draft = RuleDraft {
        name: "Attendance alert".to_string(),
        trigger_event: "attendance.absent".to_string(),
        action_json: r#"{"type":"send_notification","config":{"channel":"sms"}}"#.to_string(),
        ..RuleDraft::default()
    };
    let rule = app
        .rules
        .create_rule(tenant_id, draft.clone(), None)
        .await
        .unwrap();

    app.rules
        .update_rule(
            tenant_id,
            rule.id,
            RuleDraft {
                is_active: false,
                ..draft
            },
        )
        .await
        .unwrap();
    let fired = app
        .engine
        .handle_event(tenant_id, "attendance.absent", &json!({}))
        .await
        .unwrap();

    assert!(fired.is_empty());
}
