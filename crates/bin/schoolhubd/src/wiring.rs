//! Adapter wiring shared by the daemon and the end-to-end tests.

use std::sync::Arc;

use schoolhub_adapter_storage_sqlite_sqlx::{
    SqliteOutboxRepository, SqliteRuleRepository, SqliteRunClaimStore, SqliteTenantRepository,
};
use schoolhub_adapter_webhook_reqwest::ReqwestWebhookClient;
use schoolhub_app::action_executor::ActionExecutor;
use schoolhub_app::automation_engine::AutomationEngine;
use schoolhub_app::ports::SystemClock;
use schoolhub_app::scheduler::Scheduler;
use schoolhub_app::services::RuleService;
use sqlx::SqlitePool;

pub type Rules = Arc<SqliteRuleRepository>;
pub type Tenants = Arc<SqliteTenantRepository>;
pub type Outbox = Arc<SqliteOutboxRepository>;
pub type Webhooks = Arc<ReqwestWebhookClient>;

pub type Engine = AutomationEngine<Rules, Outbox, Webhooks>;
pub type DaemonScheduler =
    Scheduler<Rules, Tenants, SqliteRunClaimStore, Outbox, Webhooks, SystemClock>;

/// Every use-case of the daemon, backed by one connection pool.
pub struct Services {
    pub rules: RuleService<Rules>,
    pub engine: Engine,
    pub scheduler: DaemonScheduler,
    pub tenants: Tenants,
    pub outbox: Outbox,
}

impl Services {
    #[must_use]
    pub fn new(pool: &SqlitePool, webhooks: ReqwestWebhookClient) -> Self {
        let rule_repo = Arc::new(SqliteRuleRepository::new(pool.clone()));
        let tenant_repo = Arc::new(SqliteTenantRepository::new(pool.clone()));
        let outbox = Arc::new(SqliteOutboxRepository::new(pool.clone()));
        let claims = SqliteRunClaimStore::new(pool.clone());
        let webhooks = Arc::new(webhooks);

        let engine = AutomationEngine::new(
            Arc::clone(&rule_repo),
            ActionExecutor::new(Arc::clone(&outbox), Arc::clone(&webhooks)),
        );
        let scheduler = Scheduler::new(
            Arc::clone(&rule_repo),
            Arc::clone(&tenant_repo),
            claims,
            ActionExecutor::new(Arc::clone(&outbox), webhooks),
            SystemClock,
        );

        Self {
            rules: RuleService::new(rule_repo),
            engine,
            scheduler,
            tenants: tenant_repo,
            outbox,
        }
    }
}
