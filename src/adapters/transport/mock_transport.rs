//! Mock Transport for testing.
//!
//! Replies are consumed in order; once the queue is empty the fallback reply
//! (if any) is returned for every further call. Every request is recorded.
//!
//! # Example
//!
//! ```ignore
//! let transport = MockTransport::new()
//!     .with_reply(MockReply::status(503))
//!     .with_reply(MockReply::json(200, json!({"status": "healthy"})));
//!
//! let response = transport.send(&HttpRequest::get(url)).await?;
//! assert_eq!(transport.call_count(), 1);
//! ```

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::ports::{HttpRequest, HttpResponse, HttpTransport, TransportError};

/// A scripted outcome.
#[derive(Debug, Clone)]
pub enum MockReply {
    Response(HttpResponse),
    Failure(TransportError),
}

impl MockReply {
    pub fn json(status: u16, body: Value) -> Self {
        MockReply::Response(
            HttpResponse::new(status, body.to_string()).with_header("Content-Type", "application/json"),
        )
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        MockReply::Response(HttpResponse::new(status, body).with_header("Content-Type", "text/plain"))
    }

    /// Bare status with an empty body and no content type.
    pub fn status(status: u16) -> Self {
        MockReply::Response(HttpResponse::new(status, ""))
    }

    pub fn connection_refused() -> Self {
        MockReply::Failure(TransportError::connect("Failed to fetch"))
    }

    pub fn timeout() -> Self {
        MockReply::Failure(TransportError::timeout("request timed out"))
    }

    /// Adds a header to a response reply. No-op on failures.
    pub fn with_header(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        match self {
            MockReply::Response(response) => MockReply::Response(response.with_header(name, value)),
            failure => failure,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    fallback: Option<MockReply>,
    calls: Arc<Mutex<Vec<HttpRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a reply.
    pub fn with_reply(self, reply: MockReply) -> Self {
        self.push_reply(reply);
        self
    }

    /// Reply used whenever the queue is empty.
    pub fn always(mut self, reply: MockReply) -> Self {
        self.fallback = Some(reply);
        self
    }

    /// Queues a reply on a transport that is already shared.
    pub fn push_reply(&self, reply: MockReply) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
    }

    pub fn calls(&self) -> Vec<HttpRequest> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }

    pub fn last_call(&self) -> Option<HttpRequest> {
        self.calls.lock().ok().and_then(|c| c.last().cloned())
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request.clone());
        }

        let next = self.replies.lock().ok().and_then(|mut r| r.pop_front());
        match next.or_else(|| self.fallback.clone()) {
            Some(MockReply::Response(response)) => Ok(response),
            Some(MockReply::Failure(error)) => Err(error),
            None => Err(TransportError::other(format!(
                "MockTransport has no reply for {} {}",
                request.method, request.url
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn replies_in_order_then_fallback() {
        let transport = MockTransport::new()
            .with_reply(MockReply::status(503))
            .always(MockReply::json(200, json!({"ok": true})));

        let first = transport.send(&HttpRequest::get("http://x/a")).await.unwrap();
        let second = transport.send(&HttpRequest::get("http://x/b")).await.unwrap();
        let third = transport.send(&HttpRequest::get("http://x/c")).await.unwrap();

        assert_eq!(first.status, 503);
        assert_eq!(second.status, 200);
        assert_eq!(third.status, 200);
        assert_eq!(transport.call_count(), 3);
        assert_eq!(transport.last_call().unwrap().url, "http://x/c");
    }

    #[tokio::test]
    async fn empty_script_is_an_error() {
        let transport = MockTransport::new();
        assert!(transport.send(&HttpRequest::get("http://x")).await.is_err());
    }

    #[tokio::test]
    async fn failures_surface_as_transport_errors() {
        let transport = MockTransport::new().with_reply(MockReply::connection_refused());
        let error = transport.send(&HttpRequest::get("http://x")).await.unwrap_err();
        assert_eq!(error.message, "Failed to fetch");
    }
}
