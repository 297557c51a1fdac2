//! # schoolhub-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the store port traits defined in `schoolhub-app::ports`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `schoolhub-app` (for port traits) and `schoolhub-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod error;
pub mod outbox_repo;
pub mod pool;
pub mod rule_repo;
pub mod run_claims;
pub mod tenant_repo;

mod codec;

pub use outbox_repo::SqliteOutboxRepository;
pub use pool::{Config, Database};
pub use rule_repo::SqliteRuleRepository;
pub use run_claims::SqliteRunClaimStore;
pub use tenant_repo::SqliteTenantRepository;
