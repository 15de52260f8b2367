//! Error types for the pulse progress-throttling library.

use thiserror::Error;

/// Failure raised by a progress listener while handling a forwarded signal.
///
/// Listener failures never reach the worker that signalled progress. The
/// dispatcher converts them into its termination latch instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListenerError {
    #[error("Listener failed: {0}")]
    Failed(String),

    #[error("Listener panicked: {0}")]
    Panicked(String),
}

impl ListenerError {
    pub fn failed(message: impl Into<String>) -> Self {
        ListenerError::Failed(message.into())
    }
}

/// Library-level errors
#[derive(Debug, Error)]
pub enum PulseError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<config::ConfigError> for PulseError {
    fn from(err: config::ConfigError) -> Self {
        PulseError::ConfigError(err.to_string())
    }
}
