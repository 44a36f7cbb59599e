//! Raw failure shapes produced by the request layer.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Marker the backend puts in errors when the question is not covered by the
/// indexed content. Matched case-insensitively.
pub const CONTENT_NOT_FOUND_MARKER: &str = "content not found";

/// A failure as observed on the wire, before classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum RawFailure {
    /// No response arrived (connection refused, DNS, timeout, CORS).
    Transport { message: String, timed_out: bool },

    /// A response arrived with a non-success status.
    Status {
        status: u16,
        message: String,
        body: Option<String>,
        /// Raw value of `Retry-After` (or `X-RateLimit-Reset`), if present.
        retry_after: Option<String>,
    },

    /// The body of a declared-JSON response could not be decoded.
    Decode { message: String },

    /// Any other failure raised by the client itself.
    Other { message: String },
}

impl RawFailure {
    /// Creates a transport failure.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            timed_out: false,
        }
    }

    /// Creates a transport failure caused by a timeout.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            timed_out: true,
        }
    }

    /// Creates a status failure with the conventional message.
    pub fn status(status: u16) -> Self {
        Self::Status {
            status,
            message: format!("HTTP error! status: {}", status),
            body: None,
            retry_after: None,
        }
    }

    /// Attaches a response body to a status failure. No-op for other shapes.
    pub fn with_body(mut self, new_body: impl Into<String>) -> Self {
        if let Self::Status { ref mut body, .. } = self {
            *body = Some(new_body.into());
        }
        self
    }

    /// Attaches a raw retry-after header value to a status failure.
    pub fn with_retry_after(mut self, value: impl Into<String>) -> Self {
        if let Self::Status {
            ref mut retry_after,
            ..
        } = self
        {
            *retry_after = Some(value.into());
        }
        self
    }

    /// Creates a decode failure.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Creates a generic client-side failure.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// HTTP status, when a response arrived.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Human-readable message of the failure.
    pub fn message(&self) -> &str {
        match self {
            Self::Transport { message, .. }
            | Self::Status { message, .. }
            | Self::Decode { message }
            | Self::Other { message } => message,
        }
    }

    /// Response body, when a response arrived with one.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Status { body, .. } => body.as_deref(),
            _ => None,
        }
    }

    /// Wait requested by the server, if the header is present and parseable.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Status { retry_after, .. } => retry_after.as_deref().and_then(parse_retry_after),
            _ => None,
        }
    }

    /// True if the message or body carries the content-not-found marker.
    pub fn mentions_content_not_found(&self) -> bool {
        let contains = |text: &str| text.to_lowercase().contains(CONTENT_NOT_FOUND_MARKER);
        contains(self.message()) || self.body().is_some_and(contains)
    }
}

/// Parses a retry-after header value expressed in whole seconds.
///
/// HTTP-date values are not supported and yield `None`.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
