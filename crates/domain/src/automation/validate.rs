//! Normalisation and validation of rule definitions before persistence.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::trigger::{TIME_SCHEDULE_EVENT, TriggerType};
use crate::cron::CronExpression;
use crate::error::ValidationError;

/// A rule definition as submitted by its author.
///
/// `condition_json` and `action_json` hold raw JSON text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleDraft {
    pub name: String,
    pub description: String,
    pub trigger_type: String,
    pub trigger_event: String,
    pub schedule_cron: String,
    pub condition_json: String,
    pub action_json: String,
    pub is_active: bool,
}

impl Default for RuleDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            trigger_type: String::new(),
            trigger_event: String::new(),
            schedule_cron: String::new(),
            condition_json: String::new(),
            action_json: String::new(),
            is_active: true,
        }
    }
}

/// A definition that passed validation, ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRule {
    pub name: String,
    pub description: String,
    pub trigger_type: TriggerType,
    pub trigger_event: String,
    pub schedule_cron: Option<String>,
    pub condition: Value,
    pub actions: Value,
    pub is_active: bool,
}

impl RuleDraft {
    /// Trim, apply defaults, and check every definition invariant.
    ///
    /// - blank `trigger_type` defaults to `event`
    /// - `event` rules need a `trigger_event`; any cron is dropped
    /// - `time` rules get [`TIME_SCHEDULE_EVENT`] and need a parseable cron
    /// - actions must be valid JSON holding at least one descriptor
    /// - blank condition defaults to `{}`; otherwise it must be valid JSON
    ///
    /// The condition's tree shape is not checked: unrecognised shapes are
    /// accepted and simply never match.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered.
    pub fn normalize_and_validate(self) -> Result<NormalizedRule, ValidationError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }

        let trigger_type = match self.trigger_type.trim() {
            "" => TriggerType::Event,
            raw => raw.parse()?,
        };

        let (trigger_event, schedule_cron) = match trigger_type {
            TriggerType::Event => {
                let event = self.trigger_event.trim();
                if event.is_empty() {
                    return Err(ValidationError::MissingTriggerEvent);
                }
                (event.to_string(), None)
            }
            TriggerType::Time => {
                let cron = self.schedule_cron.trim();
                if cron.is_empty() {
                    return Err(ValidationError::MissingSchedule);
                }
                let parsed = CronExpression::parse(cron)?;
                (TIME_SCHEDULE_EVENT.to_string(), Some(parsed.to_string()))
            }
        };

        let actions = match self.action_json.trim() {
            "" => return Err(ValidationError::NoActions),
            raw => serde_json::from_str::<Value>(raw).map_err(ValidationError::InvalidActions)?,
        };
        let has_actions = match &actions {
            Value::Array(items) => !items.is_empty(),
            Value::Object(_) => true,
            _ => false,
        };
        if !has_actions {
            return Err(ValidationError::NoActions);
        }

        let condition = match self.condition_json.trim() {
            "" => Value::Object(serde_json::Map::new()),
            raw => serde_json::from_str(raw).map_err(ValidationError::InvalidCondition)?,
        };

        Ok(NormalizedRule {
            name,
            description: self.description.trim().to_string(),
            trigger_type,
            trigger_event,
            schedule_cron,
            condition,
            actions,
            is_active: self.is_active,
        })
    }
}
