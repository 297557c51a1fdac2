//! Scheduler — fires time-triggered rules once per matching minute.
//!
//! Every tick loads the active time rules of all tenants, localises the tick
//! instant into each owning tenant's timezone and checks the rule's cron
//! schedule against it. A due rule only runs after winning the run claim for
//! `(rule, UTC minute)`, so any number of scheduler processes can tick
//! concurrently and each firing still happens once.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use chrono_tz::Tz;
use serde_json::{Value, json};

use schoolhub_domain::automation::AutomationRule;
use schoolhub_domain::cron::CronExpression;
use schoolhub_domain::error::SchoolHubError;
use schoolhub_domain::id::{RuleId, TenantId};
use schoolhub_domain::time::{Timestamp, truncate_to_minute};

use crate::action_executor::ActionExecutor;
use crate::ports::{
    Clock, OutboxWriter, RuleRepository, RunClaimStore, TenantRepository, WebhookClient,
};

/// Interval between two ticks of [`Scheduler::run`].
pub const TICK_INTERVAL: Duration = Duration::from_secs(60);

/// Counters of a single tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Rules whose schedule matched the tick minute.
    pub due: usize,
    /// Due rules whose claim was won and whose actions ran.
    pub fired: usize,
}

/// In-process claims used while the shared claim store is unavailable.
///
/// Only deduplicates within this process.
#[derive(Debug, Default)]
pub struct FallbackClaims {
    last_run: Mutex<HashMap<RuleId, Timestamp>>,
}

impl FallbackClaims {
    /// Returns `true` unless `rule_id` was already claimed for `run_minute`.
    pub fn try_claim(&self, rule_id: RuleId, run_minute: Timestamp) -> bool {
        let mut last_run = self
            .last_run
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if last_run.get(&rule_id) == Some(&run_minute) {
            return false;
        }
        last_run.insert(rule_id, run_minute);
        true
    }
}

/// Periodic evaluator of time-triggered rules.
pub struct Scheduler<R, T, K, O, W, C> {
    rules: R,
    tenants: T,
    claims: K,
    executor: ActionExecutor<O, W>,
    clock: C,
    fallback: FallbackClaims,
}

impl<R, T, K, O, W, C> Scheduler<R, T, K, O, W, C>
where
    R: RuleRepository + Send + Sync,
    T: TenantRepository + Send + Sync,
    K: RunClaimStore + Send + Sync,
    O: OutboxWriter + Send + Sync,
    W: WebhookClient + Send + Sync,
    C: Clock + Send + Sync,
{
    pub fn new(rules: R, tenants: T, claims: K, executor: ActionExecutor<O, W>, clock: C) -> Self {
        Self {
            rules,
            tenants,
            claims,
            executor,
            clock,
            fallback: FallbackClaims::default(),
        }
    }

    /// Tick every [`TICK_INTERVAL`] until `shutdown` resolves.
    ///
    /// The first tick happens immediately. A failed tick is logged and the
    /// next one retries from scratch.
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()> + Send,
    {
        let mut ticker = tokio::time::interval(TICK_INTERVAL);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        tracing::info!(interval_secs = TICK_INTERVAL.as_secs(), "scheduler started");
        loop {
            tokio::select! {
                () = &mut shutdown => break,
                _ = ticker.tick() => {
                    let now = self.clock.now();
                    if let Err(err) = self.tick_at(now).await {
                        tracing::error!(error = %err, "scheduler tick failed");
                    }
                }
            }
        }
        tracing::info!("scheduler stopped");
    }

    /// Evaluate all active time rules against `now`.
    ///
    /// # Errors
    ///
    /// Returns a storage error if loading the rules fails. Tenant lookups,
    /// claims and actions degrade gracefully and are only logged.
    #[tracing::instrument(skip(self))]
    pub async fn tick_at(&self, now: Timestamp) -> Result<TickSummary, SchoolHubError> {
        let rules = self.rules.list_active_time_rules().await?;
        let run_minute = truncate_to_minute(now);
        let mut zones: HashMap<TenantId, Tz> = HashMap::new();
        let mut summary = TickSummary::default();

        for rule in &rules {
            let schedule = match rule.schedule() {
                Some(Ok(schedule)) => schedule,
                Some(Err(err)) => {
                    tracing::warn!(rule_id = %rule.id, error = %err, "invalid schedule, rule skipped");
                    continue;
                }
                None => {
                    tracing::warn!(rule_id = %rule.id, "time rule without schedule skipped");
                    continue;
                }
            };

            let tz = self.timezone_for(rule.tenant_id, &mut zones).await;
            if !schedule.matches(&run_minute.with_timezone(&tz)) {
                continue;
            }
            summary.due += 1;

            if !self.claim(rule.id, run_minute).await {
                tracing::debug!(rule_id = %rule.id, "run already claimed elsewhere");
                continue;
            }

            self.fire(rule, &schedule, run_minute, tz).await;
            summary.fired += 1;
        }

        Ok(summary)
    }

    async fn fire(
        &self,
        rule: &AutomationRule,
        schedule: &CronExpression,
        run_minute: Timestamp,
        tz: Tz,
    ) {
        let payload = scheduled_payload(schedule, run_minute, tz);
        let report = self
            .executor
            .execute(rule.tenant_id, &rule.actions, &payload)
            .await;
        if report.is_clean() {
            tracing::info!(rule_id = %rule.id, tenant_id = %rule.tenant_id, "scheduled rule fired");
        } else {
            tracing::warn!(
                rule_id = %rule.id,
                tenant_id = %rule.tenant_id,
                failed = report.failed,
                "scheduled rule fired with failed actions"
            );
        }
    }

    async fn claim(&self, rule_id: RuleId, run_minute: Timestamp) -> bool {
        match self.claims.try_claim(rule_id, run_minute).await {
            Ok(won) => won,
            Err(err) => {
                tracing::warn!(
                    rule_id = %rule_id,
                    error = %err,
                    "claim store unavailable, using in-process claims"
                );
                self.fallback.try_claim(rule_id, run_minute)
            }
        }
    }

    async fn timezone_for(&self, tenant_id: TenantId, zones: &mut HashMap<TenantId, Tz>) -> Tz {
        if let Some(tz) = zones.get(&tenant_id) {
            return *tz;
        }
        let tz = match self.tenants.get_by_id(tenant_id).await {
            Ok(Some(tenant)) => match tenant.timezone_name() {
                Some(name) => name.parse::<Tz>().unwrap_or_else(|_| {
                    tracing::warn!(tenant_id = %tenant_id, timezone = name, "unknown timezone, using UTC");
                    Tz::UTC
                }),
                None => Tz::UTC,
            },
            Ok(None) => {
                tracing::warn!(tenant_id = %tenant_id, "tenant not found, using UTC");
                Tz::UTC
            }
            Err(err) => {
                tracing::warn!(tenant_id = %tenant_id, error = %err, "tenant lookup failed, using UTC");
                Tz::UTC
            }
        };
        zones.insert(tenant_id, tz);
        tz
    }
}

/// Trigger payload handed to the actions of a scheduled firing.
fn scheduled_payload(schedule: &CronExpression, run_minute: Timestamp, tz: Tz) -> Value {
    json!({
        "trigger": "scheduler",
        "schedule_cron": schedule.as_str(),
        "fired_at_utc": run_minute.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        "tenant_time": run_minute.with_timezone(&tz).to_rfc3339(),
        "timezone": tz.name(),
    })
}
