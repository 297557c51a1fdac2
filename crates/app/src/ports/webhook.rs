//! Webhook port — outbound HTTP delivery.

use std::future::Future;
use std::sync::Arc;

use schoolhub_domain::error::SchoolHubError;

/// Sends a JSON document to an external endpoint.
pub trait WebhookClient {
    /// POST `body` to `url`.
    ///
    /// Transport failures and non-2xx responses are reported as
    /// [`SchoolHubError::Delivery`].
    fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> impl Future<Output = Result<(), SchoolHubError>> + Send;
}

impl<T: WebhookClient + Send + Sync> WebhookClient for Arc<T> {
    fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> impl Future<Output = Result<(), SchoolHubError>> + Send {
        (**self).post_json(url, body)
    }
}
