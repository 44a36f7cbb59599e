//! Backend API configuration

use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Where the client is running.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Test,
    Production,
}

impl Environment {
    /// Guesses the environment from the page host name.
    ///
    /// Loopback hosts are development; everything else, including static
    /// hosting domains, is production.
    pub fn detect(hostname: &str) -> Self {
        match hostname {
            "localhost" | "127.0.0.1" => Environment::Development,
            _ => Environment::Production,
        }
    }

    pub fn is_local(&self) -> bool {
        !matches!(self, Environment::Production)
    }

    /// Base URL used when none is configured.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Environment::Development | Environment::Test => "http://localhost:8000",
            Environment::Production => "https://your-deployed-backend-url.vercel.app",
        }
    }
}

/// Backend API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// API base URL. Defaults per environment.
    pub base_url: Option<String>,

    /// Auth/OAuth base URL. Defaults to `<base>/api/v1`.
    pub auth_base_url: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl ApiConfig {
    pub fn resolved_base_url(&self, environment: Environment) -> String {
        self.base_url
            .as_deref()
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| environment.default_base_url().to_string())
    }

    pub fn resolved_auth_base_url(&self, environment: Environment) -> String {
        self.auth_base_url
            .as_deref()
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("{}/api/v1", self.resolved_base_url(environment)))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate API configuration
    pub fn validate(&self, environment: Environment) -> Result<(), ValidationError> {
        let base = self.resolved_base_url(environment);
        let parsed = Url::parse(&base).map_err(|_| ValidationError::InvalidUrl {
            field: "api.base_url",
            value: base.clone(),
        })?;
        if environment == Environment::Production && parsed.scheme() != "https" {
            return Err(ValidationError::BaseUrlMustBeHttps);
        }

        let auth = self.resolved_auth_base_url(environment);
        Url::parse(&auth).map_err(|_| ValidationError::InvalidUrl {
            field: "api.auth_base_url",
            value: auth.clone(),
        })?;

        if self.request_timeout_secs == 0 || self.request_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            auth_base_url: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_request_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_defaults_to_localhost() {
        let config = ApiConfig::default();
        assert_eq!(
            config.resolved_base_url(Environment::Development),
            "http://localhost:8000"
        );
        assert_eq!(
            config.resolved_auth_base_url(Environment::Development),
            "http://localhost:8000/api/v1"
        );
    }

    #[test]
    fn explicit_urls_lose_trailing_slash() {
        let config = ApiConfig {
            base_url: Some("https://api.book.example/".into()),
            auth_base_url: Some("https://auth.book.example/v1/".into()),
            ..Default::default()
        };
        assert_eq!(
            config.resolved_base_url(Environment::Production),
            "https://api.book.example"
        );
        assert_eq!(
            config.resolved_auth_base_url(Environment::Production),
            "https://auth.book.example/v1"
        );
    }

    #[test]
    fn production_requires_https() {
        let config = ApiConfig {
            base_url: Some("http://api.book.example".into()),
            ..Default::default()
        };
        assert_eq!(
            config.validate(Environment::Production),
            Err(ValidationError::BaseUrlMustBeHttps)
        );
        assert!(config.validate(Environment::Development).is_ok());
    }

    #[test]
    fn detects_environment_from_hostname() {
        assert_eq!(Environment::detect("localhost"), Environment::Development);
        assert_eq!(Environment::detect("127.0.0.1"), Environment::Development);
        assert_eq!(Environment::detect("book.github.io"), Environment::Production);
        assert!(Environment::Test.is_local());
    }

    #[test]
    fn rejects_bad_timeout() {
        let config = ApiConfig {
            request_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(Environment::Development),
            Err(ValidationError::InvalidTimeout)
        );
    }
}
