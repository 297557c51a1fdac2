//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod clock;
pub mod outbox;
pub mod rule_repo;
pub mod run_claims;
pub mod tenant_repo;
pub mod webhook;

pub use clock::{Clock, SystemClock};
pub use outbox::OutboxWriter;
pub use rule_repo::RuleRepository;
pub use run_claims::RunClaimStore;
pub use tenant_repo::TenantRepository;
pub use webhook::WebhookClient;
