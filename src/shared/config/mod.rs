//! Sync configuration
//!
//! Options recognised by the sync controller. Built through
//! [`SyncConfigBuilder`], which validates ranges before handing out a config.

use crate::shared::format::{NameTemplate, DEFAULT_TEMPLATE, DEFAULT_TRUNCATE_LENGTH};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_DELAY_SECS: u64 = 60;
pub const DEFAULT_MAX_DELAY_SECS: u64 = 3600;
pub const DEFAULT_TRANSIENT_DELAY_SECS: u64 = 30;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// What to write when nothing is playing
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IdlePolicy {
    /// Put back the profile name captured before the first write
    #[default]
    Restore,
    /// Write an empty name
    Clear,
    /// Write a fixed text
    Text(String),
}

impl FromStr for IdlePolicy {
    type Err = ConfigError;

    /// Accepts `restore`, `clear` or `text:<value>`
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if let Some(text) = value.strip_prefix("text:") {
            return Ok(Self::Text(text.to_string()));
        }
        match value.trim().to_ascii_lowercase().as_str() {
            "restore" | "" => Ok(Self::Restore),
            "clear" => Ok(Self::Clear),
            other => Err(ConfigError::Invalid {
                field: "IDLE_POLICY",
                message: format!("unknown policy '{}'", other),
            }),
        }
    }
}

/// Sync controller configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub template: NameTemplate,
    pub truncate_length: usize,
    pub truncate_ellipsis: bool,
    pub base_delay_secs: u64,
    pub max_delay_secs: u64,
    pub transient_delay_secs: u64,
    pub request_timeout: Duration,
    pub idle: IdlePolicy,
    /// Minimum seconds between writes while the same track plays; 0 disables
    pub min_update_interval_secs: u64,
    /// Minimum seconds between writes after the track changed; 0 disables
    pub track_change_interval_secs: u64,
}

impl SyncConfig {
    /// Create a new SyncConfigBuilder
    pub fn builder() -> SyncConfigBuilder {
        SyncConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.truncate_length == 0 {
            return Err(ConfigError::Invalid {
                field: "TRUNCATE_LENGTH",
                message: "must be greater than 0".to_string(),
            });
        }
        if self.base_delay_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "BASE_DELAY_SECONDS",
                message: "must be greater than 0".to_string(),
            });
        }
        if self.max_delay_secs < self.base_delay_secs {
            return Err(ConfigError::Invalid {
                field: "MAX_DELAY_SECONDS",
                message: format!(
                    "{} is below BASE_DELAY_SECONDS ({})",
                    self.max_delay_secs, self.base_delay_secs
                ),
            });
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                field: "REQUEST_TIMEOUT_SECONDS",
                message: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            template: NameTemplate::parse(DEFAULT_TEMPLATE),
            truncate_length: DEFAULT_TRUNCATE_LENGTH,
            truncate_ellipsis: false,
            base_delay_secs: DEFAULT_BASE_DELAY_SECS,
            max_delay_secs: DEFAULT_MAX_DELAY_SECS,
            transient_delay_secs: DEFAULT_TRANSIENT_DELAY_SECS,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            idle: IdlePolicy::Restore,
            min_update_interval_secs: 0,
            track_change_interval_secs: 0,
        }
    }
}

/// Builder for SyncConfig
#[derive(Debug, Default)]
pub struct SyncConfigBuilder {
    template: Option<String>,
    truncate_length: Option<usize>,
    truncate_ellipsis: Option<bool>,
    base_delay_secs: Option<u64>,
    max_delay_secs: Option<u64>,
    transient_delay_secs: Option<u64>,
    request_timeout_secs: Option<u64>,
    idle: Option<IdlePolicy>,
    min_update_interval_secs: Option<u64>,
    track_change_interval_secs: Option<u64>,
}

impl SyncConfigBuilder {
    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn truncate_length(mut self, length: usize) -> Self {
        self.truncate_length = Some(length);
        self
    }

    pub fn truncate_ellipsis(mut self, ellipsis: bool) -> Self {
        self.truncate_ellipsis = Some(ellipsis);
        self
    }

    pub fn base_delay_secs(mut self, secs: u64) -> Self {
        self.base_delay_secs = Some(secs);
        self
    }

    pub fn max_delay_secs(mut self, secs: u64) -> Self {
        self.max_delay_secs = Some(secs);
        self
    }

    pub fn transient_delay_secs(mut self, secs: u64) -> Self {
        self.transient_delay_secs = Some(secs);
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = Some(secs);
        self
    }

    pub fn idle(mut self, idle: IdlePolicy) -> Self {
        self.idle = Some(idle);
        self
    }

    pub fn min_update_interval_secs(mut self, secs: u64) -> Self {
        self.min_update_interval_secs = Some(secs);
        self
    }

    pub fn track_change_interval_secs(mut self, secs: u64) -> Self {
        self.track_change_interval_secs = Some(secs);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<SyncConfig, ConfigError> {
        let defaults = SyncConfig::default();
        let config = SyncConfig {
            template: self
                .template
                .map(|source| NameTemplate::parse(&source))
                .unwrap_or(defaults.template),
            truncate_length: self.truncate_length.unwrap_or(defaults.truncate_length),
            truncate_ellipsis: self.truncate_ellipsis.unwrap_or(defaults.truncate_ellipsis),
            base_delay_secs: self.base_delay_secs.unwrap_or(defaults.base_delay_secs),
            max_delay_secs: self.max_delay_secs.unwrap_or(defaults.max_delay_secs),
            transient_delay_secs: self
                .transient_delay_secs
                .unwrap_or(defaults.transient_delay_secs),
            request_timeout: self
                .request_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            idle: self.idle.unwrap_or(defaults.idle),
            min_update_interval_secs: self
                .min_update_interval_secs
                .unwrap_or(defaults.min_update_interval_secs),
            track_change_interval_secs: self
                .track_change_interval_secs
                .unwrap_or(defaults.track_change_interval_secs),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("failed to read config file {path}: {message}")]
    File { path: String, message: String },
}
