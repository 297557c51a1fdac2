//! Column encoding shared by the repositories.
//!
//! Timestamps are stored as fixed-width RFC 3339 text in UTC (so text order
//! is time order) and JSON documents as compact text.

use std::str::FromStr;

use chrono::SecondsFormat;
use schoolhub_domain::time::Timestamp;

pub fn encode_timestamp(ts: Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Canonical key of a claimed minute.
pub fn encode_minute(ts: Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn decode_timestamp(raw: &str) -> Result<Timestamp, sqlx::Error> {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.to_utc())
        .map_err(|err| sqlx::Error::Decode(Box::new(err)))
}

pub fn decode_json(raw: &str) -> Result<serde_json::Value, sqlx::Error> {
    serde_json::from_str(raw).map_err(|err| sqlx::Error::Decode(Box::new(err)))
}

pub fn decode_parsed<T>(raw: &str) -> Result<T, sqlx::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    T::from_str(raw).map_err(|err| sqlx::Error::Decode(Box::new(err)))
}
