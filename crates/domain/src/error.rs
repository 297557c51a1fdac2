//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`SchoolHubError`] via `#[from]`.

use crate::cron::CronError;

/// Top-level error shared by the domain, the application layer and adapters.
#[derive(Debug, thiserror::Error)]
pub enum SchoolHubError {
    /// A rule definition broke an invariant.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A requested record does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// A persistence adapter failed.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// An outbound side effect (webhook call) failed.
    #[error("delivery error")]
    Delivery(#[from] DeliveryError),
}

/// Definition errors reported to the rule author before persistence.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("unknown trigger type {0:?}")]
    UnknownTriggerType(String),

    #[error("trigger_event is required for event rules")]
    MissingTriggerEvent,

    #[error("schedule_cron is required for time rules")]
    MissingSchedule,

    #[error("schedule_cron is invalid")]
    InvalidSchedule(#[from] CronError),

    #[error("at least one action is required")]
    NoActions,

    #[error("actions must be valid JSON")]
    InvalidActions(#[source] serde_json::Error),

    #[error("condition must be valid JSON")]
    InvalidCondition(#[source] serde_json::Error),
}

/// A record looked up by id was missing.
#[derive(Debug, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// Failure of a single outbound call.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The request never produced a response (DNS, connect, timeout, …).
    #[error("transport failure calling {url}")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The endpoint answered with a non-2xx status.
    #[error("{url} responded with status {status}")]
    Status { url: String, status: u16 },
}
