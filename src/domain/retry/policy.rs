//! Exponential backoff policy.

use std::collections::BTreeSet;
use std::time::Duration;
use thiserror::Error;

/// Status codes retried when no policy override is given.
pub const DEFAULT_RETRYABLE_STATUS_CODES: [u16; 5] = [429, 500, 502, 503, 504];

const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);
const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(10_000);
const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;

/// Errors raised when constructing an inconsistent policy.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RetryPolicyError {
    #[error("base delay {base:?} exceeds max delay {max:?}")]
    BaseExceedsMax { base: Duration, max: Duration },

    #[error("backoff multiplier must be a finite number greater than 1, got {0}")]
    InvalidMultiplier(f64),
}

/// Immutable retry policy.
///
/// `max_retries` is the total number of attempts a call may make. A policy
/// with `max_retries == 0` still makes one attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
    max_delay: Duration,
    backoff_multiplier: f64,
    retryable_status_codes: BTreeSet<u16>,
}

impl RetryPolicy {
    /// Creates a policy, checking `base_delay <= max_delay` and `multiplier > 1`.
    pub fn new(
        max_retries: u32,
        base_delay: Duration,
        max_delay: Duration,
        backoff_multiplier: f64,
        retryable_status_codes: impl IntoIterator<Item = u16>,
    ) -> Result<Self, RetryPolicyError> {
        if base_delay > max_delay {
            return Err(RetryPolicyError::BaseExceedsMax {
                base: base_delay,
                max: max_delay,
            });
        }
        if !backoff_multiplier.is_finite() || backoff_multiplier <= 1.0 {
            return Err(RetryPolicyError::InvalidMultiplier(backoff_multiplier));
        }

        Ok(Self {
            max_retries,
            base_delay,
            max_delay,
            backoff_multiplier,
            retryable_status_codes: retryable_status_codes.into_iter().collect(),
        })
    }

    /// A policy that makes exactly one attempt.
    pub fn single_attempt() -> Self {
        Self::default().with_max_retries(1)
    }

    /// Returns a copy with a different attempt budget.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Returns a copy with a different retryable status set.
    pub fn with_retryable_status_codes(mut self, codes: impl IntoIterator<Item = u16>) -> Self {
        self.retryable_status_codes = codes.into_iter().collect();
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Number of attempts actually made before giving up.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.max(1)
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    pub fn backoff_multiplier(&self) -> f64 {
        self.backoff_multiplier
    }

    pub fn retryable_status_codes(&self) -> &BTreeSet<u16> {
        &self.retryable_status_codes
    }

    /// True if a response with this status should be retried.
    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retryable_status_codes.contains(&status)
    }

    /// Wait after the given failed attempt (1-based):
    /// `min(base × multiplier^(attempt-1), max)`.
    pub fn delay_after_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let scaled = self.base_delay.as_secs_f64() * self.backoff_multiplier.powi(exponent);

        if !scaled.is_finite() || scaled >= self.max_delay.as_secs_f64() {
            return self.max_delay;
        }
        // Round to whole milliseconds so the float path cannot drift.
        Duration::from_millis((scaled * 1000.0).round() as u64).min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            retryable_status_codes: DEFAULT_RETRYABLE_STATUS_CODES.into_iter().collect(),
        }
    }
}
