//! Tenant — a school owning its own rules and configuration.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::id::TenantId;

/// A tenant with its free-form configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    #[serde(default)]
    pub config: Value,
}

impl Tenant {
    /// Configured IANA timezone name, if any.
    ///
    /// Looks at `config.timezone` first, then `config.settings.timezone`.
    /// Blank values are ignored.
    #[must_use]
    pub fn timezone_name(&self) -> Option<&str> {
        [
            self.config.get("timezone"),
            self.config.get("settings").and_then(|s| s.get("timezone")),
        ]
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|tz| !tz.is_empty())
    }
}
