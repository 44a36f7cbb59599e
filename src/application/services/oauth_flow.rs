//! OAuth authorization-code handshake.
//!
//! The flow spans a full-page redirect: `initiate` persists the CSRF state
//! token and leaves the page, and a controller built after the reload picks
//! the handshake up from the persisted token. `complete_callback` only talks
//! to the backend when the returned state matches the persisted one.

use reqwest::Url;
use serde::Deserialize;
use serde_json::json;
use std::sync::{Arc, RwLock};
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::{error, info, warn};

use super::api_client::TextbookApiClient;
use super::auth_session::{AuthSessionError, AuthSessionManager};
use super::request_executor::RequestError;
use crate::domain::auth::{AuthTokenResponse, AuthenticatedUser};
use crate::domain::classification::ErrorClassification;
use crate::domain::foundation::StateMachine;
use crate::domain::oauth::{parse_callback, CallbackDescriptor, OAuthFlowStatus, OAuthProvider};
use crate::domain::retry::RetryPolicy;
use crate::ports::{HttpRequest, KeyValueStore, NavigationError, Navigator, StorageError};

pub const DEFAULT_OAUTH_STATE_KEY: &str = "oauth_state";

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("Failed to get {provider} authorization URL: {source}")]
    AuthUrl {
        provider: OAuthProvider,
        source: RequestError,
    },

    #[error("Invalid OAuth state parameter")]
    StateMismatch,

    #[error("{message}")]
    Exchange {
        message: String,
        source: RequestError,
    },

    #[error("unexpected reply from the OAuth endpoint: {0}")]
    UnexpectedReply(String),

    #[error(transparent)]
    Navigation(#[from] NavigationError),

    #[error("failed to persist OAuth state: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Session(#[from] AuthSessionError),
}

impl OAuthError {
    pub fn classification(&self) -> ErrorClassification {
        match self {
            OAuthError::AuthUrl { source, .. } | OAuthError::Exchange { source, .. } => {
                source.classification.clone()
            }
            OAuthError::StateMismatch => ErrorClassification::auth(
                "Sign-in could not be verified. Please try logging in again.",
            ),
            OAuthError::Session(e) => e.classification(),
            other => ErrorClassification::unknown(other.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AuthUrlReply {
    auth_url: String,
    state: String,
}

pub struct OAuthFlowController {
    api: TextbookApiClient,
    auth: Arc<AuthSessionManager>,
    store: Arc<dyn KeyValueStore>,
    navigator: Arc<dyn Navigator>,
    state_key: String,
    redirect_uri: Option<String>,
    status: RwLock<OAuthFlowStatus>,
}

impl OAuthFlowController {
    /// A pending state token in storage means a handshake was started before
    /// the page reloaded.
    pub fn new(
        api: TextbookApiClient,
        auth: Arc<AuthSessionManager>,
        store: Arc<dyn KeyValueStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let controller = Self {
            api,
            auth,
            store,
            navigator,
            state_key: DEFAULT_OAUTH_STATE_KEY.to_string(),
            redirect_uri: None,
            status: RwLock::new(OAuthFlowStatus::Idle),
        };
        controller.recover_pending();
        controller
    }

    /// Switches the state slot. The status is re-derived from the new slot
    /// only.
    pub fn with_state_key(mut self, key: impl Into<String>) -> Self {
        self.state_key = key.into();
        match self.status.get_mut() {
            Ok(status) => *status = OAuthFlowStatus::Idle,
            Err(poisoned) => *poisoned.into_inner() = OAuthFlowStatus::Idle,
        }
        self.recover_pending();
        self
    }

    /// Overrides the redirect URI sent with the code exchange. Defaults to
    /// the current origin.
    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }

    pub fn status(&self) -> OAuthFlowStatus {
        match self.status.read() {
            Ok(status) => *status,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Starts a handshake: fetches the provider URL, persists its state
    /// token (replacing any earlier one) and redirects the page.
    pub async fn initiate(&self, provider: OAuthProvider) -> Result<Url, OAuthError> {
        let url = format!("{}/oauth/{}/auth-url", self.api.auth_base_url(), provider);
        let body = self
            .api
            .executor()
            .execute(&HttpRequest::get(url), None)
            .await
            .map_err(|source| OAuthError::AuthUrl { provider, source })?
            .into_json();
        let reply: AuthUrlReply =
            serde_json::from_value(body).map_err(|e| OAuthError::UnexpectedReply(e.to_string()))?;
        let target = Url::parse(&reply.auth_url)
            .map_err(|_| NavigationError::InvalidLocation(reply.auth_url.clone()))?;

        self.store.set(&self.state_key, &reply.state)?;
        self.set_status(OAuthFlowStatus::AwaitingCallback);
        info!(provider = %provider, "Redirecting to OAuth provider");

        if let Err(e) = self.navigator.redirect(&target) {
            error!(provider = %provider, error = %e, "Redirect to OAuth provider failed");
            self.fail();
            return Err(e.into());
        }
        Ok(target)
    }

    /// Recognizes a provider callback in the current location and strips its
    /// query from the visible URL.
    pub fn detect_callback(&self) -> Option<CallbackDescriptor> {
        let descriptor = parse_callback(&self.navigator.current_location())?;
        if let Err(e) = self.navigator.replace_location(&descriptor.clean_location) {
            warn!(error = %e, "Failed to strip OAuth parameters from location");
        }
        info!(provider = %descriptor.provider, "Detected OAuth callback");
        Some(descriptor)
    }

    /// Verifies the returned state and exchanges the code for a session.
    ///
    /// The persisted state token is cleared whatever the outcome.
    pub async fn complete_callback(
        &self,
        provider: OAuthProvider,
        code: &str,
        state: &str,
    ) -> Result<AuthenticatedUser, OAuthError> {
        self.recover_pending();

        if !self.state_matches(state) {
            error!(provider = %provider, "OAuth state mismatch, possible CSRF");
            self.fail();
            return Err(OAuthError::StateMismatch);
        }

        match self.exchange(provider, code).await {
            Ok(user) => {
                self.clear_state_token();
                self.set_status(OAuthFlowStatus::Completed);
                info!(provider = %provider, user_id = %user.id, "OAuth login completed");
                Ok(user)
            }
            Err(e) => {
                warn!(provider = %provider, error = %e, "OAuth code exchange failed");
                self.fail();
                Err(e)
            }
        }
    }

    /// Detects a callback in the current location and completes it.
    pub async fn handle_callback(&self) -> Option<Result<AuthenticatedUser, OAuthError>> {
        let descriptor = self.detect_callback()?;
        Some(
            self.complete_callback(descriptor.provider, &descriptor.code, &descriptor.state)
                .await,
        )
    }

    async fn exchange(&self, provider: OAuthProvider, code: &str) -> Result<AuthenticatedUser, OAuthError> {
        let redirect_uri = self
            .redirect_uri
            .clone()
            .unwrap_or_else(|| self.navigator.origin());
        let request = HttpRequest::post_json(
            format!("{}/oauth/{}", self.api.auth_base_url(), provider),
            &json!({
                "code": code,
                "provider": provider.as_str(),
                "redirect_uri": redirect_uri,
            }),
        );

        // Authorization codes are single-use.
        let body = self
            .api
            .executor()
            .execute(&request, Some(&RetryPolicy::single_attempt()))
            .await
            .map_err(|source| OAuthError::Exchange {
                message: source
                    .detail()
                    .unwrap_or_else(|| format!("OAuth {} login failed", provider)),
                source,
            })?
            .into_json();
        let reply: AuthTokenResponse =
            serde_json::from_value(body).map_err(|e| OAuthError::UnexpectedReply(e.to_string()))?;

        Ok(self.auth.establish(&reply)?)
    }

    fn state_matches(&self, returned: &str) -> bool {
        match self.store.get(&self.state_key) {
            Ok(Some(stored)) if !stored.is_empty() => {
                stored.as_bytes().ct_eq(returned.as_bytes()).into()
            }
            Ok(_) => false,
            Err(e) => {
                warn!(error = %e, "OAuth state unreadable");
                false
            }
        }
    }

    fn recover_pending(&self) {
        let pending = matches!(self.store.get(&self.state_key), Ok(Some(s)) if !s.is_empty());
        if pending && self.status() != OAuthFlowStatus::AwaitingCallback {
            self.set_status(OAuthFlowStatus::AwaitingCallback);
        }
    }

    fn fail(&self) {
        self.clear_state_token();
        self.set_status(OAuthFlowStatus::Failed);
    }

    fn clear_state_token(&self) {
        if let Err(e) = self.store.remove(&self.state_key) {
            warn!(error = %e, "Failed to clear OAuth state");
        }
    }

    fn set_status(&self, target: OAuthFlowStatus) {
        let mut status = match self.status.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match status.transition_to(target) {
            Ok(next) => *status = next,
            Err(e) => warn!(error = %e, "Ignoring illegal OAuth status change"),
        }
    }
}
