//! In-memory port fakes shared by the unit tests of this crate.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Mutex;

use schoolhub_domain::automation::{AutomationRule, TriggerType};
use schoolhub_domain::error::{DeliveryError, SchoolHubError};
use schoolhub_domain::id::{RuleId, TenantId};
use schoolhub_domain::outbox::{NewOutboxEvent, OutboxEvent};
use schoolhub_domain::tenant::Tenant;
use schoolhub_domain::time::Timestamp;

use crate::ports::{Clock, OutboxWriter, RuleRepository, RunClaimStore, TenantRepository, WebhookClient};

// ── Rules ──────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryRules {
    store: Mutex<Vec<AutomationRule>>,
    pub fail_reads: bool,
}

impl InMemoryRules {
    pub fn with(rules: Vec<AutomationRule>) -> Self {
        Self {
            store: Mutex::new(rules),
            fail_reads: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            store: Mutex::new(Vec::new()),
            fail_reads: true,
        }
    }

    fn filtered(
        &self,
        keep: impl Fn(&AutomationRule) -> bool,
    ) -> Result<Vec<AutomationRule>, SchoolHubError> {
        if self.fail_reads {
            return Err(SchoolHubError::Storage("rule store offline".into()));
        }
        let store = self.store.lock().unwrap();
        Ok(store.iter().filter(|r| keep(r)).cloned().collect())
    }
}

impl RuleRepository for InMemoryRules {
    fn create(
        &self,
        rule: AutomationRule,
    ) -> impl Future<Output = Result<AutomationRule, SchoolHubError>> + Send {
        self.store.lock().unwrap().push(rule.clone());
        async { Ok(rule) }
    }

    fn get_by_id(
        &self,
        tenant_id: TenantId,
        id: RuleId,
    ) -> impl Future<Output = Result<Option<AutomationRule>, SchoolHubError>> + Send {
        let r = self
            .filtered(|r| r.tenant_id == tenant_id && r.id == id)
            .map(|rules| rules.into_iter().next());
        async { r }
    }

    fn list_for_tenant(
        &self,
        tenant_id: TenantId,
    ) -> impl Future<Output = Result<Vec<AutomationRule>, SchoolHubError>> + Send {
        let r = self.filtered(|r| r.tenant_id == tenant_id);
        async { r }
    }

    fn list_active_for_event(
        &self,
        tenant_id: TenantId,
        event_type: &str,
    ) -> impl Future<Output = Result<Vec<AutomationRule>, SchoolHubError>> + Send {
        let r = self.filtered(|r| {
            r.tenant_id == tenant_id && r.is_active && r.trigger_event == event_type
        });
        async { r }
    }

    fn list_active_time_rules(
        &self,
    ) -> impl Future<Output = Result<Vec<AutomationRule>, SchoolHubError>> + Send {
        let r = self.filtered(|r| r.is_active && r.trigger_type == TriggerType::Time);
        async { r }
    }

    fn update(
        &self,
        rule: AutomationRule,
    ) -> impl Future<Output = Result<AutomationRule, SchoolHubError>> + Send {
        let mut store = self.store.lock().unwrap();
        if let Some(slot) = store.iter_mut().find(|r| r.id == rule.id) {
            *slot = rule.clone();
        }
        async { Ok(rule) }
    }

    fn delete(
        &self,
        tenant_id: TenantId,
        id: RuleId,
    ) -> impl Future<Output = Result<bool, SchoolHubError>> + Send {
        let mut store = self.store.lock().unwrap();
        let before = store.len();
        store.retain(|r| !(r.tenant_id == tenant_id && r.id == id));
        let deleted = store.len() < before;
        async move { Ok(deleted) }
    }
}

// ── Tenants ────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryTenants {
    store: Mutex<HashMap<TenantId, Tenant>>,
    pub lookups: Mutex<usize>,
}

impl InMemoryTenants {
    pub fn with(tenants: Vec<Tenant>) -> Self {
        Self {
            store: Mutex::new(tenants.into_iter().map(|t| (t.id, t)).collect()),
            lookups: Mutex::new(0),
        }
    }

    pub fn lookup_count(&self) -> usize {
        *self.lookups.lock().unwrap()
    }
}

impl TenantRepository for InMemoryTenants {
    fn get_by_id(
        &self,
        id: TenantId,
    ) -> impl Future<Output = Result<Option<Tenant>, SchoolHubError>> + Send {
        *self.lookups.lock().unwrap() += 1;
        let r = self.store.lock().unwrap().get(&id).cloned();
        async { Ok(r) }
    }
}

// ── Claims ─────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryClaims {
    claimed: Mutex<HashSet<(RuleId, Timestamp)>>,
    pub offline: bool,
}

impl InMemoryClaims {
    pub fn offline() -> Self {
        Self {
            claimed: Mutex::new(HashSet::new()),
            offline: true,
        }
    }
}

impl RunClaimStore for InMemoryClaims {
    fn try_claim(
        &self,
        rule_id: RuleId,
        run_minute: Timestamp,
    ) -> impl Future<Output = Result<bool, SchoolHubError>> + Send {
        let r = if self.offline {
            Err(SchoolHubError::Storage("claim store offline".into()))
        } else {
            Ok(self.claimed.lock().unwrap().insert((rule_id, run_minute)))
        };
        async { r }
    }
}

// ── Outbox ─────────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingOutbox {
    events: Mutex<Vec<OutboxEvent>>,
}

impl RecordingOutbox {
    pub fn events(&self) -> Vec<OutboxEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl OutboxWriter for RecordingOutbox {
    fn create_outbox_event(
        &self,
        event: NewOutboxEvent,
    ) -> impl Future<Output = Result<OutboxEvent, SchoolHubError>> + Send {
        let stored = OutboxEvent::pending(event, schoolhub_domain::time::now());
        self.events.lock().unwrap().push(stored.clone());
        async { Ok(stored) }
    }
}

// ── Webhook ────────────────────────────────────────────────────────

/// Records every call; URLs containing `unreachable` fail with a transport error.
#[derive(Default)]
pub struct RecordingWebhook {
    calls: Mutex<Vec<(String, serde_json::Value)>>,
}

impl RecordingWebhook {
    pub fn calls(&self) -> Vec<(String, serde_json::Value)> {
        self.calls.lock().unwrap().clone()
    }
}

impl WebhookClient for RecordingWebhook {
    fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> impl Future<Output = Result<(), SchoolHubError>> + Send {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), body.clone()));
        let r = if url.contains("unreachable") {
            Err(DeliveryError::Transport {
                url: url.to_string(),
                source: "connection refused".into(),
            }
            .into())
        } else {
            Ok(())
        };
        async { r }
    }
}

// ── Clock ──────────────────────────────────────────────────────────

pub struct FixedClock(pub Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}
