//! Trigger — what causes a rule to be considered.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Sentinel `trigger_event` stored on time rules.
pub const TIME_SCHEDULE_EVENT: &str = "time.schedule";

/// How a rule is activated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    /// Fires when an event with the rule's `trigger_event` is handled.
    #[default]
    Event,
    /// Fires when the rule's cron schedule matches the tenant-local minute.
    Time,
}

impl TriggerType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Time => "time",
        }
    }
}

impl FromStr for TriggerType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "event" => Ok(Self::Event),
            "time" => Ok(Self::Time),
            _ => Err(ValidationError::UnknownTriggerType(s.to_string())),
        }
    }
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
