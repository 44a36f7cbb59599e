//! Request executor - retrying HTTP with exponential backoff.
//!
//! Every call resolves to exactly one outcome: a decoded body or a
//! classified error. Attempts are strictly sequential.

use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::domain::classification::{classify, ErrorClassification, ErrorKind, RawFailure};
use crate::domain::foundation::Timestamp;
use crate::domain::retry::RetryPolicy;
use crate::ports::{BackoffTimer, HttpRequest, HttpResponse, HttpTransport};

/// Decoded body of a successful response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Body of a response declared as JSON.
    Json(Value),
    /// Any other body, verbatim.
    Text(String),
}

impl ResponseBody {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }

    /// The JSON value, or the text wrapped as a JSON string.
    pub fn into_json(self) -> Value {
        match self {
            ResponseBody::Json(value) => value,
            ResponseBody::Text(text) => Value::String(text),
        }
    }
}

/// A request that failed for good.
#[derive(Debug, Clone, Error)]
#[error("{classification}")]
pub struct RequestError {
    pub classification: ErrorClassification,
    pub failure: RawFailure,
    /// Attempts made before giving up.
    pub attempts: u32,
}

impl RequestError {
    fn new(failure: RawFailure, attempts: u32) -> Self {
        Self {
            classification: classify(&failure),
            failure,
            attempts,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.classification.kind()
    }

    pub fn status(&self) -> Option<u16> {
        self.failure.status_code()
    }

    /// The `detail` field of a JSON error body, as the backend reports
    /// login and OAuth failures.
    pub fn detail(&self) -> Option<String> {
        let body: Value = serde_json::from_str(self.failure.body()?).ok()?;
        body.get("detail")?.as_str().map(str::to_string)
    }
}

/// Executes requests under a retry policy.
#[derive(Clone)]
pub struct RequestExecutor {
    transport: Arc<dyn HttpTransport>,
    timer: Arc<dyn BackoffTimer>,
    default_policy: RetryPolicy,
}

impl RequestExecutor {
    pub fn new(transport: Arc<dyn HttpTransport>, timer: Arc<dyn BackoffTimer>) -> Self {
        Self {
            transport,
            timer,
            default_policy: RetryPolicy::default(),
        }
    }

    pub fn with_default_policy(mut self, policy: RetryPolicy) -> Self {
        self.default_policy = policy;
        self
    }

    pub fn default_policy(&self) -> &RetryPolicy {
        &self.default_policy
    }

    /// Sends `request`, retrying per `policy` (or the default policy).
    ///
    /// Transport failures and statuses in the policy's retryable set are
    /// retried until the attempt budget runs out. Other statuses and body
    /// decode failures end the call immediately.
    ///
    /// # Errors
    ///
    /// `RequestError` carrying the classification of the last failure.
    pub async fn execute(
        &self,
        request: &HttpRequest,
        policy: Option<&RetryPolicy>,
    ) -> Result<ResponseBody, RequestError> {
        let policy = policy.unwrap_or(&self.default_policy);
        let max_attempts = policy.max_attempts();
        let started = Instant::now();
        let mut attempt = 0;

        loop {
            attempt += 1;
            let attempt_started = Instant::now();

            let failure = match self.attempt(request).await {
                Ok(body) => {
                    info!(
                        url = %request.url,
                        method = %request.method,
                        attempt,
                        elapsed_ms = elapsed_ms(attempt_started),
                        "API request succeeded"
                    );
                    return Ok(body);
                }
                Err(failure) => failure,
            };

            let retryable = is_retryable(&failure, policy);
            if !retryable {
                warn!(
                    url = %request.url,
                    method = %request.method,
                    attempt,
                    status = ?failure.status_code(),
                    error = %failure.message(),
                    elapsed_ms = elapsed_ms(attempt_started),
                    "API request failed with non-retryable error"
                );
                return Err(RequestError::new(failure, attempt));
            }

            if attempt >= max_attempts {
                error!(
                    url = %request.url,
                    method = %request.method,
                    total_attempts = attempt,
                    status = ?failure.status_code(),
                    error = %failure.message(),
                    total_ms = elapsed_ms(started),
                    "API request failed after all retries"
                );
                return Err(RequestError::new(failure, attempt));
            }

            warn!(
                url = %request.url,
                method = %request.method,
                attempt,
                max_attempts,
                status = ?failure.status_code(),
                error = %failure.message(),
                elapsed_ms = elapsed_ms(attempt_started),
                "Retrying API request"
            );

            let delay = server_requested_delay(&failure)
                .unwrap_or_else(|| policy.delay_after_attempt(attempt));
            debug!(
                url = %request.url,
                attempt,
                delay_ms = delay.as_millis() as u64,
                "Waiting before retry"
            );
            self.timer.wait(delay).await;
        }
    }

    async fn attempt(&self, request: &HttpRequest) -> Result<ResponseBody, RawFailure> {
        let response = self.transport.send(request).await.map_err(|e| {
            if e.is_timeout() {
                RawFailure::timeout(e.message)
            } else {
                RawFailure::transport(e.message)
            }
        })?;

        if !response.is_success() {
            return Err(status_failure(&response));
        }

        if response.is_json() {
            serde_json::from_str(&response.body)
                .map(ResponseBody::Json)
                .map_err(|e| RawFailure::decode(e.to_string()))
        } else {
            Ok(ResponseBody::Text(response.body))
        }
    }
}

fn is_retryable(failure: &RawFailure, policy: &RetryPolicy) -> bool {
    match failure {
        RawFailure::Transport { .. } => true,
        RawFailure::Status { status, .. } => policy.is_retryable_status(*status),
        RawFailure::Decode { .. } | RawFailure::Other { .. } => false,
    }
}

/// A 429's own wait overrides the computed backoff.
fn server_requested_delay(failure: &RawFailure) -> Option<Duration> {
    if failure.status_code() == Some(429) {
        failure.retry_after()
    } else {
        None
    }
}

fn status_failure(response: &HttpResponse) -> RawFailure {
    let mut failure = RawFailure::status(response.status);
    if !response.body.is_empty() {
        failure = failure.with_body(response.body.clone());
    }
    if let Some(wait) = retry_after_header(response) {
        failure = failure.with_retry_after(wait);
    }
    failure
}

/// `Retry-After` in seconds, else `X-RateLimit-Reset` normalised to seconds
/// from now (the header is either a delta or a Unix epoch in seconds).
fn retry_after_header(response: &HttpResponse) -> Option<String> {
    if let Some(value) = response.header("retry-after") {
        return Some(value.trim().to_string());
    }
    let reset = response.header("x-ratelimit-reset")?.trim().parse::<i64>().ok()?;
    const EPOCH_THRESHOLD: i64 = 1_000_000_000;
    let seconds = if reset >= EPOCH_THRESHOLD {
        (reset - Timestamp::now().as_unix_millis() / 1000).max(0)
    } else {
        reset.max(0)
    };
    Some(seconds.to_string())
}

fn elapsed_ms(since: Instant) -> u64 {
    since.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{MockReply, MockTransport, RecordingBackoffTimer};
    use serde_json::json;

    const URL: &str = "http://localhost:8000/health";

    fn executor(transport: &MockTransport, timer: &RecordingBackoffTimer) -> RequestExecutor {
        RequestExecutor::new(Arc::new(transport.clone()), Arc::new(timer.clone()))
    }

    fn secs(values: &[u64]) -> Vec<Duration> {
        values.iter().map(|s| Duration::from_secs(*s)).collect()
    }

    #[tokio::test]
    async fn success_on_first_attempt_does_not_wait() {
        let transport = MockTransport::new().with_reply(MockReply::json(200, json!({"status": "healthy"})));
        let timer = RecordingBackoffTimer::new();

        let body = executor(&transport, &timer)
            .execute(&HttpRequest::get(URL), None)
            .await
            .unwrap();

        assert_eq!(body.as_json().unwrap()["status"], "healthy");
        assert_eq!(transport.call_count(), 1);
        assert!(timer.waits().is_empty());
    }

    #[tokio::test]
    async fn retryable_statuses_back_off_then_succeed() {
        let transport = MockTransport::new()
            .with_reply(MockReply::status(503))
            .with_reply(MockReply::status(503))
            .with_reply(MockReply::json(200, json!({"ok": true})));
        let timer = RecordingBackoffTimer::new();

        let result = executor(&transport, &timer)
            .execute(&HttpRequest::get(URL), None)
            .await;

        assert!(result.is_ok());
        assert_eq!(transport.call_count(), 3);
        assert_eq!(timer.waits(), secs(&[1, 2]));
    }

    #[tokio::test]
    async fn exhausted_retries_surface_last_classification() {
        let transport = MockTransport::new().always(MockReply::status(500));
        let timer = RecordingBackoffTimer::new();

        let error = executor(&transport, &timer)
            .execute(&HttpRequest::get(URL), None)
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Server);
        assert_eq!(error.attempts, 3);
        assert_eq!(transport.call_count(), 3);
        assert_eq!(timer.waits(), secs(&[1, 2]));
    }

    #[tokio::test]
    async fn non_retryable_status_fails_after_one_attempt() {
        let transport = MockTransport::new().always(MockReply::status(404));
        let timer = RecordingBackoffTimer::new();

        let error = executor(&transport, &timer)
            .execute(&HttpRequest::get(URL), None)
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert_eq!(error.attempts, 1);
        assert_eq!(transport.call_count(), 1);
        assert!(timer.waits().is_empty());
    }

    #[tokio::test]
    async fn transport_failures_are_retried_as_network_errors() {
        let transport = MockTransport::new().always(MockReply::connection_refused());
        let timer = RecordingBackoffTimer::new();

        let error = executor(&transport, &timer)
            .execute(&HttpRequest::get(URL), None)
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Network);
        assert_eq!(transport.call_count(), 3);
    }

    #[tokio::test]
    async fn gateway_timeout_is_retried_but_classified_unknown() {
        let transport = MockTransport::new().always(MockReply::status(504));
        let timer = RecordingBackoffTimer::new();

        let error = executor(&transport, &timer)
            .execute(&HttpRequest::get(URL), None)
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Unknown);
        assert_eq!(error.attempts, 3);
    }

    #[tokio::test]
    async fn retry_after_overrides_backoff() {
        let transport = MockTransport::new()
            .with_reply(MockReply::status(429).with_header("Retry-After", "7"))
            .with_reply(MockReply::json(200, json!({})));
        let timer = RecordingBackoffTimer::new();

        executor(&transport, &timer)
            .execute(&HttpRequest::get(URL), None)
            .await
            .unwrap();

        assert_eq!(timer.waits(), secs(&[7]));
    }

    #[tokio::test]
    async fn rate_limit_reset_delta_overrides_backoff() {
        let transport = MockTransport::new()
            .with_reply(MockReply::status(429).with_header("X-RateLimit-Reset", "3"))
            .with_reply(MockReply::json(200, json!({})));
        let timer = RecordingBackoffTimer::new();

        executor(&transport, &timer)
            .execute(&HttpRequest::get(URL), None)
            .await
            .unwrap();

        assert_eq!(timer.waits(), secs(&[3]));
    }

    #[tokio::test]
    async fn rate_limit_without_header_uses_backoff_and_default_wait() {
        let transport = MockTransport::new().always(MockReply::status(429));
        let timer = RecordingBackoffTimer::new();

        let error = executor(&transport, &timer)
            .execute(&HttpRequest::get(URL), None)
            .await
            .unwrap_err();

        assert_eq!(timer.waits(), secs(&[1, 2]));
        assert_eq!(error.kind(), ErrorKind::RateLimit);
        assert_eq!(error.classification.retry_after(), Some(Duration::from_secs(60)));
    }

    #[tokio::test]
    async fn undecodable_json_is_fatal() {
        let transport = MockTransport::new()
            .always(MockReply::text(200, "{oops").with_header("Content-Type", "application/json"));
        let timer = RecordingBackoffTimer::new();

        let error = executor(&transport, &timer)
            .execute(&HttpRequest::get(URL), None)
            .await
            .unwrap_err();

        assert!(matches!(error.failure, RawFailure::Decode { .. }));
        assert_eq!(error.kind(), ErrorKind::Unknown);
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn non_json_bodies_are_returned_as_text() {
        let transport = MockTransport::new().with_reply(MockReply::text(200, "pong"));
        let timer = RecordingBackoffTimer::new();

        let body = executor(&transport, &timer)
            .execute(&HttpRequest::get(URL), None)
            .await
            .unwrap();

        assert_eq!(body, ResponseBody::Text("pong".to_string()));
    }

    #[tokio::test]
    async fn zero_retries_still_makes_one_attempt() {
        let transport = MockTransport::new().always(MockReply::status(503));
        let timer = RecordingBackoffTimer::new();
        let policy = RetryPolicy::default().with_max_retries(0);

        let error = executor(&transport, &timer)
            .execute(&HttpRequest::get(URL), Some(&policy))
            .await
            .unwrap_err();

        assert_eq!(error.attempts, 1);
        assert!(timer.waits().is_empty());
    }

    #[tokio::test]
    async fn per_call_policy_overrides_default() {
        let transport = MockTransport::new().always(MockReply::status(502));
        let timer = RecordingBackoffTimer::new();
        let policy = RetryPolicy::default().with_max_retries(5);

        let error = executor(&transport, &timer)
            .execute(&HttpRequest::get(URL), Some(&policy))
            .await
            .unwrap_err();

        assert_eq!(error.attempts, 5);
        assert_eq!(timer.waits(), secs(&[1, 2, 4, 8]));
    }

    #[tokio::test]
    async fn content_not_found_body_is_classified_before_status() {
        let transport = MockTransport::new()
            .always(MockReply::json(404, json!({"detail": "Content not found in textbook"})));
        let timer = RecordingBackoffTimer::new();

        let error = executor(&transport, &timer)
            .execute(&HttpRequest::get(URL), None)
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::ContentNotFound);
        assert_eq!(error.status(), Some(404));
    }
}
