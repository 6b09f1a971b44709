//! Shared error types for configuration loading

use thiserror::Error;

/// Errors raised while loading configuration or initialising logging
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Missing required configuration: {var}")]
    Missing { var: String },

    #[error("Invalid configuration value for {var}: {reason}")]
    Invalid { var: String, reason: String },

    #[error(transparent)]
    Source(#[from] config::ConfigError),

    #[error("Failed to initialise logging: {reason}")]
    Logging { reason: String },
}

pub type LoadResult<T> = Result<T, LoadError>;
