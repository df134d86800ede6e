//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Feed server URL must use ws:// or wss://")]
    InvalidFeedUrl,

    #[error("Reconnect backoff must have a non-zero delay and attempt budget")]
    InvalidBackoff,

    #[error("Buffer capacities must be non-zero")]
    InvalidBufferCapacity,
}
