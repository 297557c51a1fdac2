//! # schoolhub-adapter-webhook-reqwest
//!
//! Implements [`WebhookClient`] with a shared [`reqwest::Client`].
//!
//! Every request is a single `POST` with a JSON body, a fixed `User-Agent`
//! and a bounded total timeout. There are no retries; callers log failures
//! and move on.
//!
//! ## Dependency rule
//! Depends on `schoolhub-app` (for the port trait) and `schoolhub-domain`
//! (for error types). The `app` and `domain` crates must never reference
//! this adapter.

use std::time::Duration;

use schoolhub_app::ports::WebhookClient;
use schoolhub_domain::error::{DeliveryError, SchoolHubError};

/// Default total request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default `User-Agent` header value.
pub const DEFAULT_USER_AGENT: &str = concat!("schoolhub-automation/", env!("CARGO_PKG_VERSION"));

/// Errors building the HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum WebhookClientError {
    #[error("failed to build HTTP client")]
    Build(#[from] reqwest::Error),
}

/// Configuration for [`ReqwestWebhookClient`].
#[derive(Debug, Clone)]
pub struct Config {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Config {
    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookClientError`] if the TLS backend cannot be initialised.
    pub fn build(self) -> Result<ReqwestWebhookClient, WebhookClientError> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent)
            .build()?;
        Ok(ReqwestWebhookClient { client })
    }
}

/// Webhook delivery over HTTP(S).
#[derive(Debug, Clone)]
pub struct ReqwestWebhookClient {
    client: reqwest::Client,
}

impl WebhookClient for ReqwestWebhookClient {
    #[tracing::instrument(skip(self, body))]
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<(), SchoolHubError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| DeliveryError::Transport {
                url: url.to_string(),
                source: Box::new(err),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        tracing::debug!(status = status.as_u16(), "webhook accepted");
        Ok(())
    }
}
