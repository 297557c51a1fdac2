//! Time and timestamp helpers.

use chrono::{DateTime, DurationRound, TimeDelta, Utc};

/// UTC timestamp used for audit fields, outbox scheduling and run claims.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Drop seconds and sub-second precision.
///
/// Run claims are keyed by this value, so two callers observing any instant
/// inside the same UTC minute agree on the key.
#[must_use]
pub fn truncate_to_minute(ts: Timestamp) -> Timestamp {
    ts.duration_trunc(TimeDelta::minutes(1)).unwrap_or(ts)
}
