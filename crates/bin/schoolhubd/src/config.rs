//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `schoolhub.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Scheduler settings.
    pub scheduler: SchedulerConfig,
    /// Outbound webhook settings.
    pub webhook: WebhookConfig,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Scheduler configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Run the time-trigger scheduler in this process.
    pub enabled: bool,
}

/// Webhook client configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// Total request timeout in seconds.
    pub timeout_secs: u64,
    /// `User-Agent` header sent with every call.
    pub user_agent: String,
}

impl Config {
    /// Load configuration from `schoolhub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("schoolhub.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("SCHOOLHUB_DATABASE_URL") {
            self.database.url = val;
        }
        if let Some(val) = lookup("SCHOOLHUB_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("SCHOOLHUB_SCHEDULER_ENABLED") {
            if let Ok(enabled) = val.parse() {
                self.scheduler.enabled = enabled;
            }
        }
        if let Some(val) = lookup("SCHOOLHUB_WEBHOOK_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                self.webhook.timeout_secs = secs;
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "database url must not be empty".to_string(),
            ));
        }
        if self.webhook.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "webhook timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }
}

impl WebhookConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:schoolhub.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "schoolhubd=info,schoolhub_app=info".to_string(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            timeout_secs: schoolhub_adapter_webhook_reqwest::DEFAULT_TIMEOUT.as_secs(),
            user_agent: schoolhub_adapter_webhook_reqwest::DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
