//! Retry policy configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::domain::retry::RetryPolicy;

#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Comma-separated status codes, e.g. `429,500,502,503,504`
    #[serde(default = "default_retryable_status_codes")]
    pub retryable_status_codes: String,
}

impl RetryConfig {
    pub fn status_codes(&self) -> Result<Vec<u16>, ValidationError> {
        self.retryable_status_codes
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<u16>()
                    .ok()
                    .filter(|code| (100..600).contains(code))
                    .ok_or_else(|| ValidationError::InvalidStatusCode(s.to_string()))
            })
            .collect()
    }

    /// Validate retry configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.base_delay_ms > self.max_delay_ms {
            return Err(ValidationError::BaseDelayExceedsMax);
        }
        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier <= 1.0 {
            return Err(ValidationError::InvalidBackoffMultiplier);
        }
        self.status_codes()?;
        Ok(())
    }

    /// Builds the policy this configuration describes.
    pub fn to_policy(&self) -> Result<RetryPolicy, ValidationError> {
        self.validate()?;
        RetryPolicy::new(
            self.max_retries,
            Duration::from_millis(self.base_delay_ms),
            Duration::from_millis(self.max_delay_ms),
            self.backoff_multiplier,
            self.status_codes()?,
        )
        .map_err(|_| ValidationError::InvalidBackoffMultiplier)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            retryable_status_codes: default_retryable_status_codes(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    10_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_retryable_status_codes() -> String {
    "429,500,502,503,504".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_build_the_default_policy() {
        let policy = RetryConfig::default().to_policy().unwrap();
        assert_eq!(policy, RetryPolicy::default());
    }

    #[test]
    fn parses_status_list_with_spaces() {
        let config = RetryConfig {
            retryable_status_codes: "503, 429 ,".into(),
            ..Default::default()
        };
        assert_eq!(config.status_codes().unwrap(), vec![503, 429]);
    }

    #[test]
    fn rejects_garbage_status() {
        let config = RetryConfig {
            retryable_status_codes: "503,abc".into(),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidStatusCode("abc".into()))
        );
    }

    #[test]
    fn rejects_inverted_delays_and_flat_multiplier() {
        let inverted = RetryConfig {
            base_delay_ms: 20_000,
            ..Default::default()
        };
        assert_eq!(inverted.validate(), Err(ValidationError::BaseDelayExceedsMax));

        let flat = RetryConfig {
            backoff_multiplier: 1.0,
            ..Default::default()
        };
        assert_eq!(flat.validate(), Err(ValidationError::InvalidBackoffMultiplier));
    }
}
