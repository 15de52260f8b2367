//! Merge rules: defaults first, later sources override earlier ones.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

use super::super::{DEFAULT_FREQUENCY_MS, DEFAULT_LOCK_TIMEOUT_SECONDS};

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("throttle.frequency_ms", DEFAULT_FREQUENCY_MS as i64)?
        .set_default("throttle.lock_timeout_seconds", DEFAULT_LOCK_TIMEOUT_SECONDS as i64)?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stderr")
}
