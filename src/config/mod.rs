//! Client configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `TEXTBOOK_CHAT` prefix
//! and nested values use `__` as separator.
//!
//! # Example
//!
//! ```no_run
//! use textbook_chat_client::config::ClientConfig;
//!
//! let config = ClientConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Backend at {}", config.base_url());
//! ```

mod api;
mod error;
mod logging;
mod oauth;
mod retry;
mod storage;

pub use api::{ApiConfig, Environment};
pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;
pub use oauth::OAuthConfig;
pub use retry::RetryConfig;
pub use storage::StorageConfig;

use serde::Deserialize;

/// Root client configuration
///
/// Every section has defaults, so an empty environment yields a working
/// development configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub environment: Environment,

    /// Backend URLs and timeouts
    #[serde(default)]
    pub api: ApiConfig,

    /// Default retry policy
    #[serde(default)]
    pub retry: RetryConfig,

    /// Persistence keys and selection freshness
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub oauth: OAuthConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ClientConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `TEXTBOOK_CHAT` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `TEXTBOOK_CHAT__ENVIRONMENT=production`
    /// - `TEXTBOOK_CHAT__API__BASE_URL=https://...` -> `api.base_url`
    /// - `TEXTBOOK_CHAT__RETRY__MAX_RETRIES=5` -> `retry.max_retries`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("TEXTBOOK_CHAT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.api.validate(self.environment)?;
        self.retry.validate()?;
        self.storage.validate()?;
        Ok(())
    }

    pub fn base_url(&self) -> String {
        self.api.resolved_base_url(self.environment)
    }

    pub fn auth_base_url(&self) -> String {
        self.api.resolved_auth_base_url(self.environment)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}
