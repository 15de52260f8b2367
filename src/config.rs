//! Configuration System
//!
//! Layered configuration for the progress throttle and logging. Sources are
//! merged in order: built-in defaults, an optional TOML file, then `PULSE__*`
//! environment variables (e.g. `PULSE__THROTTLE__FREQUENCY_MS=250`).

use crate::error::PulseError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

mod merge;
mod sources;

/// Default minimum gap between forwarded progress signals.
pub const DEFAULT_FREQUENCY_MS: u64 = 1_000;

/// Default lock timeout handed to workers.
pub const DEFAULT_LOCK_TIMEOUT_SECONDS: u64 = 60;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PulseConfig {
    /// Progress throttling settings
    #[serde(default)]
    pub throttle: ThrottleConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for a throttling progress callback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottleConfig {
    /// Minimum milliseconds between forwarded signals; zero forwards any
    /// signal whose clock reading moved past the previous forward.
    #[serde(default = "default_frequency_ms")]
    pub frequency_ms: u64,

    /// Lock timeout in seconds reported to workers
    #[serde(default = "default_lock_timeout_seconds")]
    pub lock_timeout_seconds: u64,
}

fn default_frequency_ms() -> u64 {
    DEFAULT_FREQUENCY_MS
}

fn default_lock_timeout_seconds() -> u64 {
    DEFAULT_LOCK_TIMEOUT_SECONDS
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            frequency_ms: default_frequency_ms(),
            lock_timeout_seconds: default_lock_timeout_seconds(),
        }
    }
}

impl ThrottleConfig {
    /// Validate throttle configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.lock_timeout_seconds == 0 {
            return Err("lock_timeout_seconds must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Throttle(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Throttle(msg) => write!(f, "Throttle: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl PulseConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.throttle.validate() {
            errors.push(ValidationError::Throttle(e));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Loads [`PulseConfig`] from the layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load defaults plus environment overrides.
    pub fn load() -> Result<PulseConfig, PulseError> {
        Self::build(None)
    }

    /// Load defaults, the given file (which must exist), then environment overrides.
    pub fn load_from_file(path: &Path) -> Result<PulseConfig, PulseError> {
        Self::build(Some(path))
    }

    /// Default configuration without consulting any source.
    pub fn defaults() -> PulseConfig {
        PulseConfig::default()
    }

    fn build(path: Option<&Path>) -> Result<PulseConfig, PulseError> {
        let mut builder = merge::merge_policy::builder_with_defaults()?;
        if let Some(path) = path {
            builder = sources::file::add_to_builder(builder, path)?;
        }
        builder = sources::env::add_to_builder(builder);

        let config: PulseConfig = builder.build()?.try_deserialize()?;
        config.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            PulseError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;
        Ok(config)
    }
}
