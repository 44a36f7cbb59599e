//! The flat classification taxonomy and the `classify` function.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::failure::RawFailure;
use crate::domain::foundation::Timestamp;

/// Wait suggested to the user when a 429 carries no usable header.
pub const DEFAULT_RATE_LIMIT_WAIT: Duration = Duration::from_secs(60);

/// Category of a failure. Exhaustive and flat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    RateLimit,
    Validation,
    Auth,
    Forbidden,
    NotFound,
    Server,
    ContentNotFound,
    Unknown,
}

impl ErrorKind {
    /// Stable snake_case name, as used in logs and UI payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Network => "network",
            ErrorKind::RateLimit => "rate_limit",
            ErrorKind::Validation => "validation",
            ErrorKind::Auth => "auth",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Server => "server",
            ErrorKind::ContentNotFound => "content_not_found",
            ErrorKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presentation tier chosen by the UI (inline hint vs. blocking error).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Result of classifying a failure. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorClassification {
    kind: ErrorKind,
    message: String,
    severity: Severity,
    #[serde(with = "optional_millis", default)]
    retry_after: Option<Duration>,
}

impl ErrorClassification {
    fn new(kind: ErrorKind, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            kind,
            message: message.into(),
            severity,
            retry_after: None,
        }
    }

    /// Classification for a payload rejected by contract validation.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message, Severity::Medium)
    }

    /// Classification for a rejected sign-in that never reached the server.
    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Auth, message, Severity::High)
    }

    /// Classification for failures the taxonomy has no better bucket for.
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, message, Severity::High)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Suggested wait before trying again (rate limits only).
    pub fn retry_after(&self) -> Option<Duration> {
        self.retry_after
    }

    /// Projects the classification into the record shown by the UI.
    pub fn to_user_facing(&self) -> UserFacingError {
        UserFacingError {
            message: self.message.clone(),
            kind: self.kind,
            severity: self.severity,
            retry_after_ms: self.retry_after.map(|d| d.as_millis() as u64),
            timestamp: Timestamp::now(),
        }
    }
}

impl fmt::Display for ErrorClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// What the UI renders for a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFacingError {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub severity: Severity,
    #[serde(rename = "retryAfter", skip_serializing_if = "Option::is_none")]
    pub retry_after_ms: Option<u64>,
    pub timestamp: Timestamp,
}

/// Classifies a raw failure. Pure: equal inputs give equal outputs.
pub fn classify(failure: &RawFailure) -> ErrorClassification {
    if let RawFailure::Transport { .. } = failure {
        return network();
    }

    if failure.mentions_content_not_found() {
        return ErrorClassification::new(
            ErrorKind::ContentNotFound,
            "The topic you asked about doesn't appear to be covered in the textbook. \
             Try asking about a different topic or be more specific.",
            Severity::Medium,
        );
    }

    match failure {
        RawFailure::Status { status, .. } => classify_status(*status, failure),
        RawFailure::Decode { message } => ErrorClassification::unknown(format!(
            "Server error: the response could not be read ({})",
            message
        )),
        RawFailure::Other { message } if message.is_empty() => {
            ErrorClassification::unknown("An unexpected error occurred. Please try again.")
        }
        RawFailure::Other { message } => ErrorClassification::unknown(message.clone()),
        RawFailure::Transport { .. } => network(),
    }
}

fn network() -> ErrorClassification {
    ErrorClassification::new(
        ErrorKind::Network,
        "Network error: Unable to connect to the server. \
         Please check your internet connection and try again.",
        Severity::High,
    )
}

fn classify_status(status: u16, failure: &RawFailure) -> ErrorClassification {
    match status {
        400 => ErrorClassification::validation(
            "Invalid request: Please check your input and try again.",
        ),
        401 => ErrorClassification::new(
            ErrorKind::Auth,
            "Authentication required: Please log in to continue.",
            Severity::High,
        ),
        403 => ErrorClassification::new(
            ErrorKind::Forbidden,
            "Access denied: You do not have permission to perform this action.",
            Severity::High,
        ),
        404 => ErrorClassification::new(
            ErrorKind::NotFound,
            "Service unavailable: The requested resource was not found.",
            Severity::High,
        ),
        429 => {
            let wait = failure.retry_after().unwrap_or(DEFAULT_RATE_LIMIT_WAIT);
            let mut classification = ErrorClassification::new(
                ErrorKind::RateLimit,
                format!(
                    "Too many requests: Please wait {} seconds before trying again.",
                    wait.as_secs()
                ),
                Severity::Medium,
            );
            classification.retry_after = Some(wait);
            classification
        }
        500 | 502 | 503 => ErrorClassification::new(
            ErrorKind::Server,
            "Service temporarily unavailable: Our servers are experiencing issues. \
             Please try again later.",
            Severity::High,
        ),
        _ => ErrorClassification::unknown(format!("Server error: {}", failure.message())),
    }
}

/// True if the failure is a rate limit.
pub fn is_rate_limit(failure: &RawFailure) -> bool {
    failure.status_code() == Some(429)
}

/// True if no response arrived, or the client reported a network-ish failure.
pub fn is_network(failure: &RawFailure) -> bool {
    match failure {
        RawFailure::Transport { .. } => true,
        RawFailure::Other { message } => {
            let lowered = message.to_lowercase();
            ["failed to fetch", "network", "cors", "cross-origin"]
                .iter()
                .any(|needle| lowered.contains(needle))
        }
        _ => false,
    }
}

/// True if the failure carries the content-not-found marker.
pub fn is_content_not_found(failure: &RawFailure) -> bool {
    !matches!(failure, RawFailure::Transport { .. }) && failure.mentions_content_not_found()
}

mod optional_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_some(&(d.as_millis() as u64)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(d)?.map(Duration::from_millis))
    }
}
