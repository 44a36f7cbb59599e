//! Typed client for the textbook backend.
//!
//! Each call validates its payload against the endpoint's request contract
//! before sending and the reply against the response contract after
//! receiving. Network behaviour (retries, classification) comes from the
//! request executor.

use secrecy::Secret;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use super::request_executor::{RequestError, RequestExecutor};
use crate::domain::auth::{AuthTokenResponse, LoginCredentials, Registration, UserPreferences};
use crate::domain::classification::ErrorClassification;
use crate::domain::contract::{ApiEndpoint, ValidationResult};
use crate::ports::HttpRequest;

/// Body of `POST /api/v1/chat`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            selected_text: None,
            session_id: None,
        }
    }

    pub fn with_selected_text(mut self, text: impl Into<String>) -> Self {
        self.selected_text = Some(text.into());
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub session_id: String,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default, deserialize_with = "optional_count")]
    pub retrieved_chunks_count: Option<u64>,
    #[serde(default)]
    pub response_time: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    #[serde(default)]
    pub dependencies: Option<Value>,
}

impl HealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IngestionResponse {
    pub status: String,
    #[serde(default, deserialize_with = "optional_count")]
    pub pages_processed: Option<u64>,
    #[serde(default, deserialize_with = "optional_count")]
    pub chunks_created: Option<u64>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Failures of a typed API call.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("Invalid request: {}", .0.joined_messages())]
    InvalidRequest(ValidationResult),

    #[error("Invalid response: {}", .0.joined_messages())]
    InvalidResponse(ValidationResult),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("Unexpected response shape: {0}")]
    UnexpectedShape(String),
}

impl ApiError {
    /// Classification to show the user.
    pub fn classification(&self) -> ErrorClassification {
        match self {
            ApiError::InvalidRequest(_) => ErrorClassification::validation(self.to_string()),
            ApiError::InvalidResponse(_) | ApiError::UnexpectedShape(_) => {
                ErrorClassification::unknown(self.to_string())
            }
            ApiError::Request(e) => e.classification.clone(),
        }
    }

    /// The backend's `detail` message, when the error body carried one.
    pub fn detail(&self) -> Option<String> {
        match self {
            ApiError::Request(e) => e.detail(),
            _ => None,
        }
    }
}

/// Backend client.
#[derive(Clone)]
pub struct TextbookApiClient {
    executor: RequestExecutor,
    base_url: String,
    auth_base_url: String,
}

impl TextbookApiClient {
    pub fn new(
        executor: RequestExecutor,
        base_url: impl Into<String>,
        auth_base_url: impl Into<String>,
    ) -> Self {
        Self {
            executor,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_base_url: auth_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth_base_url(&self) -> &str {
        &self.auth_base_url
    }

    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    pub fn url_for(&self, endpoint: ApiEndpoint) -> String {
        let base = if endpoint.uses_auth_base() {
            &self.auth_base_url
        } else {
            &self.base_url
        };
        format!("{}{}", base, endpoint.path())
    }

    /// Sends a chat turn.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        let payload = to_value(request)?;
        self.call_json(ApiEndpoint::Chat, |url| HttpRequest::post_json(url, &payload), &payload)
            .await
    }

    pub async fn health_check(&self) -> Result<HealthResponse, ApiError> {
        self.call_json(ApiEndpoint::Health, HttpRequest::get, &Value::Null)
            .await
    }

    /// Triggers content ingestion. The request body is opaque.
    pub async fn ingest(&self, payload: &Value) -> Result<IngestionResponse, ApiError> {
        self.call_json(ApiEndpoint::Ingestion, |url| HttpRequest::post_json(url, payload), payload)
            .await
    }

    pub async fn login(&self, credentials: &LoginCredentials) -> Result<AuthTokenResponse, ApiError> {
        let body = credentials.to_body();
        self.call_json(ApiEndpoint::Login, |url| HttpRequest::post_json(url, &body), &body)
            .await
    }

    /// Creates an account. The reply body is not used.
    pub async fn register(&self, registration: &Registration) -> Result<(), ApiError> {
        let body = registration.to_body();
        let request = HttpRequest::post_json(self.url_for(ApiEndpoint::Register), &body);
        self.executor.execute(&request, None).await?;
        Ok(())
    }

    pub async fn preferences(&self, token: &Secret<String>) -> Result<UserPreferences, ApiError> {
        self.call_json(
            ApiEndpoint::Preferences,
            |url| HttpRequest::get(url).with_bearer(token),
            &Value::Null,
        )
        .await
    }

    pub async fn update_preferences(
        &self,
        token: &Secret<String>,
        preferences: &UserPreferences,
    ) -> Result<UserPreferences, ApiError> {
        let body = to_value(preferences)?;
        self.call_json(
            ApiEndpoint::Preferences,
            |url| HttpRequest::put_json(url, &body).with_bearer(token),
            &body,
        )
        .await
    }

    async fn call_json<T, F>(&self, endpoint: ApiEndpoint, build: F, payload: &Value) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        F: FnOnce(String) -> HttpRequest,
    {
        let pre = endpoint.validate_request(payload);
        if !pre.is_valid() {
            warn!(endpoint = ?endpoint, errors = %pre.joined_messages(), "Request failed contract validation");
            return Err(ApiError::InvalidRequest(pre));
        }

        let request = build(self.url_for(endpoint));
        let body = self.executor.execute(&request, None).await?.into_json();

        let post = endpoint.validate_response(&body);
        if !post.is_valid() {
            warn!(endpoint = ?endpoint, errors = %post.joined_messages(), "Response failed contract validation");
            return Err(ApiError::InvalidResponse(post));
        }

        serde_json::from_value(body).map_err(|e| ApiError::UnexpectedShape(e.to_string()))
    }
}

/// Counts arrive as JSON numbers, sometimes with a `.0`.
fn optional_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<f64>::deserialize(deserializer)? {
        None => Ok(None),
        Some(n) if n >= 0.0 && n.fract() == 0.0 && n <= u64::MAX as f64 => Ok(Some(n as u64)),
        Some(n) => Err(serde::de::Error::custom(format!(
            "expected a non-negative whole number, got {}",
            n
        ))),
    }
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::UnexpectedShape(e.to_string()))
}
