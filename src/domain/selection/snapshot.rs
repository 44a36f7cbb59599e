use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::domain::foundation::Timestamp;

/// How long a cached selection stays usable.
pub const DEFAULT_SELECTION_TTL: Duration = Duration::from_secs(3600);

/// Text the reader highlighted, with where and when.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionSnapshot {
    pub text: String,
    /// Unix milliseconds.
    pub timestamp: i64,
    #[serde(default)]
    pub context: Value,
    #[serde(default)]
    pub url: Option<String>,
}

impl SelectionSnapshot {
    pub fn new(text: impl Into<String>, context: Value, url: Option<String>) -> Self {
        Self::taken_at(text, context, url, Timestamp::now())
    }

    pub fn taken_at(text: impl Into<String>, context: Value, url: Option<String>, at: Timestamp) -> Self {
        Self {
            text: text.into(),
            timestamp: at.as_unix_millis(),
            context,
            url,
        }
    }

    /// True while `now - timestamp` is below `ttl`.
    pub fn is_fresh(&self, now: Timestamp, ttl: Duration) -> bool {
        let age_ms = now.as_unix_millis().saturating_sub(self.timestamp);
        age_ms < ttl.as_millis() as i64
    }
}
