//! Run claim port — cross-process deduplication of scheduled firings.

use std::future::Future;
use std::sync::Arc;

use schoolhub_domain::error::SchoolHubError;
use schoolhub_domain::id::RuleId;
use schoolhub_domain::time::Timestamp;

/// Atomic "first writer wins" store keyed by `(rule, UTC minute)`.
///
/// Claims are never released; a minute does not recur.
pub trait RunClaimStore {
    /// Try to claim `run_minute` for `rule_id`.
    ///
    /// Returns `true` only for the first caller.
    fn try_claim(
        &self,
        rule_id: RuleId,
        run_minute: Timestamp,
    ) -> impl Future<Output = Result<bool, SchoolHubError>> + Send;
}

impl<T: RunClaimStore + Send + Sync> RunClaimStore for Arc<T> {
    fn try_claim(
        &self,
        rule_id: RuleId,
        run_minute: Timestamp,
    ) -> impl Future<Output = Result<bool, SchoolHubError>> + Send {
        (**self).try_claim(rule_id, run_minute)
    }
}
