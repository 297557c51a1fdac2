//! Action — a side-effecting step performed when a rule fires.
//!
//! Rules store actions as raw `{type, config}` descriptors so that unknown
//! types survive persistence. [`ActionSpec::resolve`] turns a descriptor
//! into a typed [`Action`] at execution time.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::time::Timestamp;

/// Outbox event type written by `send_notification`.
pub const NOTIFICATION_DISPATCH_EVENT: &str = "automation.notification.dispatch";

/// An action descriptor exactly as authored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSpec {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub config: Value,
}

impl ActionSpec {
    /// Decode a rule's `actions` value.
    ///
    /// Accepts a list of descriptors or a single descriptor object.
    ///
    /// # Errors
    ///
    /// Returns the decode error of the list form when neither shape fits.
    pub fn list_from_value(actions: &Value) -> Result<Vec<Self>, serde_json::Error> {
        match Vec::<Self>::deserialize(actions) {
            Ok(list) => Ok(list),
            Err(list_err) => Self::deserialize(actions)
                .map(|single| vec![single])
                .map_err(|_| list_err),
        }
    }

    /// Normalised type name: trimmed and lower-cased.
    #[must_use]
    pub fn kind(&self) -> String {
        self.kind.trim().to_ascii_lowercase()
    }

    /// Decode `config` according to the action type.
    ///
    /// # Errors
    ///
    /// Returns an error when `config` does not fit the type's schema.
    pub fn resolve(&self) -> Result<Action, serde_json::Error> {
        let config = match &self.config {
            Value::Null => Value::Object(Map::new()),
            other => other.clone(),
        };
        Ok(match self.kind().as_str() {
            "send_notification" => Action::SendNotification(serde_json::from_value(config)?),
            "webhook" => Action::Webhook(serde_json::from_value(config)?),
            "emit_event" | "enqueue_event" | "outbox_event" => {
                Action::EmitEvent(serde_json::from_value(config)?)
            }
            _ => Action::Unknown(self.kind.clone()),
        })
    }
}

/// Typed action ready for execution.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Queue a notification for the external dispatch worker.
    SendNotification(NotificationConfig),
    /// POST the trigger payload to a URL.
    Webhook(WebhookConfig),
    /// Write a custom outbox event, optionally carrying the trigger payload.
    EmitEvent(EmitEventConfig),
    /// Type not understood; ignored.
    Unknown(String),
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SendNotification(_) => f.write_str("send_notification"),
            Self::Webhook(cfg) => write!(f, "webhook({})", cfg.url),
            Self::EmitEvent(cfg) => write!(f, "emit_event({})", cfg.event_type.trim()),
            Self::Unknown(kind) => write!(f, "unknown({kind})"),
        }
    }
}

/// `send_notification` configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Overrides [`NOTIFICATION_DISPATCH_EVENT`] when non-blank.
    pub event_type: String,
    pub channel: String,
    pub channels: Vec<String>,
    pub recipients: Vec<String>,
    pub template_code: String,
    pub locale: String,
    pub subject: String,
    pub body: String,
    pub data: Value,
}

impl NotificationConfig {
    #[must_use]
    pub fn event_type(&self) -> &str {
        match self.event_type.trim() {
            "" => NOTIFICATION_DISPATCH_EVENT,
            other => other,
        }
    }

    /// Non-blank channels, with the singular `channel` appended last.
    #[must_use]
    pub fn channels(&self) -> Vec<String> {
        self.channels
            .iter()
            .chain(std::iter::once(&self.channel))
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Payload handed to the notification worker.
    #[must_use]
    pub fn outbox_payload(&self, trigger_payload: &Value, triggered_at: Timestamp) -> Value {
        serde_json::json!({
            "source": "automation",
            "channels": self.channels(),
            "recipients": self.recipients,
            "template_code": self.template_code.trim(),
            "locale": self.locale.trim(),
            "subject": self.subject.trim(),
            "body": self.body,
            "data": self.data,
            "event_payload": trigger_payload,
            "triggered_at": triggered_at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        })
    }
}

/// `webhook` configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    pub url: String,
}

/// `emit_event` configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitEventConfig {
    pub event_type: String,
    pub payload: Map<String, Value>,
    pub merge_trigger_payload: bool,
    pub process_after_seconds: i64,
}

impl EmitEventConfig {
    /// Build the emitted payload.
    ///
    /// Trigger fields are copied first (when merging and the trigger is an
    /// object), then static `payload` keys override them. An empty result
    /// is replaced by a `{source, triggered_at}` marker.
    #[must_use]
    pub fn build_payload(&self, trigger_payload: &Value, triggered_at: Timestamp) -> Value {
        let mut merged = Map::new();
        if self.merge_trigger_payload {
            if let Value::Object(trigger) = trigger_payload {
                merged.extend(trigger.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }
        merged.extend(self.payload.iter().map(|(k, v)| (k.clone(), v.clone())));
        if merged.is_empty() {
            merged.insert("source".to_string(), Value::from("automation"));
            merged.insert(
                "triggered_at".to_string(),
                Value::from(triggered_at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)),
            );
        }
        Value::Object(merged)
    }

    /// When the emitted event becomes eligible for processing.
    ///
    /// # Errors
    ///
    /// Returns [`DelayOutOfRange`] when the delay does not fit a timestamp.
    pub fn process_after(&self, now: Timestamp) -> Result<Timestamp, DelayOutOfRange> {
        if self.process_after_seconds <= 0 {
            return Ok(now);
        }
        chrono::TimeDelta::try_seconds(self.process_after_seconds)
            .and_then(|delay| now.checked_add_signed(delay))
            .ok_or(DelayOutOfRange(self.process_after_seconds))
    }
}

/// `process_after_seconds` pushes the event past the representable range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("process_after_seconds {0} is out of range")]
pub struct DelayOutOfRange(pub i64);
