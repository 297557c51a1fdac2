//! Outbox port — append-only sink for side-effect records.

use std::future::Future;
use std::sync::Arc;

use schoolhub_domain::error::SchoolHubError;
use schoolhub_domain::outbox::{NewOutboxEvent, OutboxEvent};

/// Appends records for the downstream outbox consumer.
pub trait OutboxWriter {
    /// Persist a new pending outbox record.
    fn create_outbox_event(
        &self,
        event: NewOutboxEvent,
    ) -> impl Future<Output = Result<OutboxEvent, SchoolHubError>> + Send;
}

impl<T: OutboxWriter + Send + Sync> OutboxWriter for Arc<T> {
    fn create_outbox_event(
        &self,
        event: NewOutboxEvent,
    ) -> impl Future<Output = Result<OutboxEvent, SchoolHubError>> + Send {
        (**self).create_outbox_event(event)
    }
}
