//! # schoolhub-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `RuleRepository` — CRUD and trigger lookups for automation rules
//!   - `TenantRepository` — tenant records (timezone resolution)
//!   - `RunClaimStore` — atomic per-minute claims for scheduled firings
//!   - `OutboxWriter` — append side-effect records for downstream workers
//!   - `WebhookClient` — outbound HTTP delivery
//!   - `Clock` — current instant
//! - Define **driving/inbound** use-cases:
//!   - `AutomationEngine` — evaluate event-triggered rules
//!   - `Scheduler` — evaluate time-triggered rules every minute
//!   - `ActionExecutor` — run a fired rule's actions
//!   - `RuleService` — validated rule CRUD
//! - Orchestrate domain objects without knowing *how* persistence or IO works
//!
//! ## Dependency rule
//! Depends on `schoolhub-domain` only (plus `tokio` for the scheduler timer).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod action_executor;
pub mod automation_engine;
pub mod ports;
pub mod scheduler;
pub mod services;

#[cfg(test)]
mod testing;
