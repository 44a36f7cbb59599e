//! HTTP Transport Port - one request, one response, no retries.
//!
//! Retrying, classification and decoding live in the request executor; a
//! transport only moves bytes and reports whether a response arrived.

use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// HTTP verbs the client uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    /// POST with a JSON body and `Content-Type: application/json`.
    pub fn post_json(url: impl Into<String>, body: &Value) -> Self {
        Self::new(HttpMethod::Post, url).with_json(body)
    }

    pub fn put_json(url: impl Into<String>, body: &Value) -> Self {
        Self::new(HttpMethod::Put, url).with_json(body)
    }

    pub fn with_json(mut self, body: &Value) -> Self {
        self.body = Some(body.to_string());
        self.with_header("Content-Type", "application/json")
    }

    /// Sets a header, replacing any existing value with the same name.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    pub fn with_bearer(self, token: &Secret<String>) -> Self {
        self.with_header("Authorization", format!("Bearer {}", token.expose_secret()))
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// A response that arrived, whatever its status.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// True when the declared content type is JSON (including `+json` types).
    pub fn is_json(&self) -> bool {
        self.content_type().is_some_and(|ct| {
            let mime = ct.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
            mime == "application/json" || mime.ends_with("+json")
        })
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Why no response arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Connect,
    Timeout,
    Other,
}

/// The request never produced a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn connect(message: impl Into<String>) -> Self {
        Self {
            kind: TransportErrorKind::Connect,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: TransportErrorKind::Timeout,
            message: message.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self {
            kind: TransportErrorKind::Other,
            message: message.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == TransportErrorKind::Timeout
    }
}

/// Port for sending a single HTTP request.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends `request` once.
    ///
    /// # Errors
    ///
    /// `TransportError` only when no response was received. Non-2xx statuses
    /// are returned as `Ok`.
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn post_json_sets_content_type_and_body() {
        let request = HttpRequest::post_json("http://x/api", &json!({"a": 1}));
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.body.as_deref(), Some(r#"{"a":1}"#));
    }

    #[test]
    fn bearer_header_is_set_once() {
        let token = Secret::new("tok".to_string());
        let request = HttpRequest::get("http://x")
            .with_bearer(&token)
            .with_bearer(&token);
        assert_eq!(request.headers.len(), 1);
        assert_eq!(request.header("authorization"), Some("Bearer tok"));
    }

    #[test]
    fn json_detection_handles_parameters_and_suffixes() {
        let json = HttpResponse::new(200, "{}").with_header("Content-Type", "application/json; charset=utf-8");
        let problem = HttpResponse::new(400, "{}").with_header("content-type", "application/problem+json");
        let text = HttpResponse::new(200, "hi").with_header("Content-Type", "text/plain");

        assert!(json.is_json());
        assert!(problem.is_json());
        assert!(!text.is_json());
        assert!(!HttpResponse::new(200, "").is_json());
    }
}
