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
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid URL for {field}: {value}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("API base URL must use HTTPS in production")]
    BaseUrlMustBeHttps,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Retry base delay exceeds max delay")]
    BaseDelayExceedsMax,

    #[error("Backoff multiplier must be greater than 1")]
    InvalidBackoffMultiplier,

    #[error("Invalid retryable status code: {0}")]
    InvalidStatusCode(String),

    #[error("Storage key '{0}' must not be empty")]
    EmptyStorageKey(&'static str),

    #[error("Selection TTL must be positive")]
    InvalidSelectionTtl,
}
