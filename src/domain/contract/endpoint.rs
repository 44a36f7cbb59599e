use serde_json::Value;

use super::result::ValidationResult;
use super::schemas::SchemaKind;
use super::validator::validate;

/// Backend endpoints the client talks to and the contracts attached to each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiEndpoint {
    Chat,
    Health,
    Ingestion,
    Register,
    Login,
    Preferences,
}

impl ApiEndpoint {
    /// Path relative to the base URL the endpoint lives under.
    pub fn path(&self) -> &'static str {
        match self {
            ApiEndpoint::Chat => "/api/v1/chat",
            ApiEndpoint::Health => "/health",
            ApiEndpoint::Ingestion => "/api/v1/ingestion",
            ApiEndpoint::Register => "/auth/register",
            ApiEndpoint::Login => "/auth/login",
            ApiEndpoint::Preferences => "/auth/preferences",
        }
    }

    /// True for endpoints rooted at the auth base URL instead of the API base.
    pub fn uses_auth_base(&self) -> bool {
        matches!(
            self,
            ApiEndpoint::Register | ApiEndpoint::Login | ApiEndpoint::Preferences
        )
    }

    pub fn request_schema(&self) -> Option<SchemaKind> {
        match self {
            ApiEndpoint::Chat => Some(SchemaKind::ChatRequest),
            _ => None,
        }
    }

    pub fn response_schema(&self) -> Option<SchemaKind> {
        match self {
            ApiEndpoint::Chat => Some(SchemaKind::ChatResponse),
            ApiEndpoint::Health => Some(SchemaKind::HealthResponse),
            ApiEndpoint::Ingestion => Some(SchemaKind::IngestionResponse),
            _ => None,
        }
    }

    /// Pre-flight check. Endpoints without a request contract always pass.
    pub fn validate_request(&self, payload: &Value) -> ValidationResult {
        match self.request_schema() {
            Some(kind) => validate(payload, kind),
            None => ValidationResult::valid(),
        }
    }

    /// Post-flight check. Endpoints without a response contract always pass.
    pub fn validate_response(&self, payload: &Value) -> ValidationResult {
        match self.response_schema() {
            Some(kind) => validate(payload, kind),
            None => ValidationResult::valid(),
        }
    }
}
