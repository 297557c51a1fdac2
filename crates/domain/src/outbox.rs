//! Outbox — durable records of side effects for asynchronous workers.
//!
//! The automation engine only ever appends; delivery and retries belong to
//! the workers that drain the outbox.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::id::{OutboxEventId, TenantId};
use crate::time::Timestamp;

/// Processing state of an outbox record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutboxStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

impl OutboxStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for OutboxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown outbox status {0:?}")]
pub struct UnknownOutboxStatus(pub String);

impl FromStr for OutboxStatus {
    type Err = UnknownOutboxStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(UnknownOutboxStatus(other.to_string())),
        }
    }
}

/// A record to append to the outbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOutboxEvent {
    pub tenant_id: TenantId,
    pub event_type: String,
    pub payload: Value,
    /// Earliest instant a worker may pick the record up.
    pub process_after: Timestamp,
}

/// A stored outbox record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboxEvent {
    pub id: OutboxEventId,
    pub tenant_id: TenantId,
    pub event_type: String,
    pub payload: Value,
    pub status: OutboxStatus,
    pub process_after: Timestamp,
    pub created_at: Timestamp,
}

impl OutboxEvent {
    /// Materialise a pending record from a request.
    #[must_use]
    pub fn pending(event: NewOutboxEvent, now: Timestamp) -> Self {
        Self {
            id: OutboxEventId::new(),
            tenant_id: event.tenant_id,
            event_type: event.event_type,
            payload: event.payload,
            status: OutboxStatus::Pending,
            process_after: event.process_after,
            created_at: now,
        }
    }
}
