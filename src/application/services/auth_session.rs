//! Authenticated user session: bearer token plus user record, persisted so a
//! reload keeps the reader signed in.

use secrecy::{ExposeSecret, Secret};
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tracing::{info, warn};

use super::api_client::{ApiError, TextbookApiClient};
use crate::domain::auth::{AuthTokenResponse, AuthenticatedUser, LoginCredentials, Registration};
use crate::domain::classification::ErrorClassification;
use crate::domain::foundation::ValidationError;
use crate::ports::{read_json, write_json, KeyValueStore, StorageError};

pub const DEFAULT_TOKEN_KEY: &str = "textbook_token";
pub const DEFAULT_USER_KEY: &str = "textbook_user";

#[derive(Debug, Error)]
pub enum AuthSessionError {
    #[error(transparent)]
    InvalidInput(#[from] ValidationError),

    #[error("{message}")]
    Api { message: String, source: ApiError },

    #[error("failed to persist auth session: {0}")]
    Storage(#[from] StorageError),
}

impl AuthSessionError {
    fn from_api(source: ApiError, fallback: &str) -> Self {
        let message = source.detail().unwrap_or_else(|| fallback.to_string());
        AuthSessionError::Api { message, source }
    }

    pub fn classification(&self) -> ErrorClassification {
        match self {
            AuthSessionError::InvalidInput(e) => ErrorClassification::validation(e.to_string()),
            AuthSessionError::Api { source, .. } => source.classification(),
            AuthSessionError::Storage(e) => ErrorClassification::unknown(e.to_string()),
        }
    }
}

struct SignedIn {
    token: Secret<String>,
    user: AuthenticatedUser,
}

/// Owns the persisted token and user record.
pub struct AuthSessionManager {
    api: TextbookApiClient,
    store: Arc<dyn KeyValueStore>,
    token_key: String,
    user_key: String,
    state: RwLock<Option<SignedIn>>,
}

impl AuthSessionManager {
    pub fn new(api: TextbookApiClient, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            api,
            store,
            token_key: DEFAULT_TOKEN_KEY.to_string(),
            user_key: DEFAULT_USER_KEY.to_string(),
            state: RwLock::new(None),
        }
    }

    pub fn with_keys(mut self, token_key: impl Into<String>, user_key: impl Into<String>) -> Self {
        self.token_key = token_key.into();
        self.user_key = user_key.into();
        self
    }

    /// Reloads the persisted session. A token without a readable user record
    /// is discarded together with the record.
    pub fn restore(&self) -> Option<AuthenticatedUser> {
        let token = match self.store.get(&self.token_key) {
            Ok(Some(token)) if !token.is_empty() => token,
            Ok(_) => return None,
            Err(e) => {
                warn!(error = %e, "Auth token unreadable");
                return None;
            }
        };

        match read_json::<AuthenticatedUser>(self.store.as_ref(), &self.user_key) {
            Ok(Some(user)) => {
                info!(user_id = %user.id, "Restored auth session");
                self.set_state(Some(SignedIn {
                    token: Secret::new(token),
                    user: user.clone(),
                }));
                Some(user)
            }
            Ok(None) | Err(_) => {
                warn!("Stored user record missing or corrupt, clearing auth session");
                self.forget();
                None
            }
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<AuthenticatedUser, AuthSessionError> {
        let credentials = LoginCredentials::new(username, password)?;
        let reply = self
            .api
            .login(&credentials)
            .await
            .map_err(|e| AuthSessionError::from_api(e, "Login failed"))?;
        self.establish(&reply)
    }

    /// Registers, then signs in with the same credentials.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedUser, AuthSessionError> {
        let registration = Registration::new(username, email, password)?;
        self.api
            .register(&registration)
            .await
            .map_err(|e| AuthSessionError::from_api(e, "Registration failed"))?;

        let reply = self
            .api
            .login(&registration.credentials())
            .await
            .map_err(|e| AuthSessionError::from_api(e, "Login failed"))?;
        self.establish(&reply)
    }

    /// Persists a token reply from login or the OAuth exchange.
    ///
    /// A token is never left in storage without its user record.
    pub fn establish(&self, reply: &AuthTokenResponse) -> Result<AuthenticatedUser, AuthSessionError> {
        let user = reply.user();
        write_json(self.store.as_ref(), &self.user_key, &user)?;
        if let Err(e) = self.store.set(&self.token_key, &reply.token) {
            self.forget();
            return Err(e.into());
        }
        self.set_state(Some(SignedIn {
            token: Secret::new(reply.token.clone()),
            user: user.clone(),
        }));
        info!(user_id = %user.id, "Signed in");
        Ok(user)
    }

    pub fn logout(&self) {
        self.forget();
        info!("Signed out");
    }

    pub fn is_authenticated(&self) -> bool {
        self.read_state(|s| s.is_some())
    }

    pub fn user(&self) -> Option<AuthenticatedUser> {
        self.read_state(|s| s.as_ref().map(|s| s.user.clone()))
    }

    pub fn bearer_token(&self) -> Option<Secret<String>> {
        self.read_state(|s| {
            s.as_ref()
                .map(|s| Secret::new(s.token.expose_secret().clone()))
        })
    }

    fn forget(&self) {
        for key in [&self.token_key, &self.user_key] {
            if let Err(e) = self.store.remove(key) {
                warn!(key = %key, error = %e, "Failed to clear auth storage");
            }
        }
        self.set_state(None);
    }

    fn set_state(&self, next: Option<SignedIn>) {
        match self.state.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }

    fn read_state<T>(&self, f: impl FnOnce(&Option<SignedIn>) -> T) -> T {
        match self.state.read() {
            Ok(guard) => f(&guard),
            Err(poisoned) => f(&poisoned.into_inner()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryKeyValueStore, MockReply, MockTransport, RecordingBackoffTimer};
    use crate::application::services::RequestExecutor;
    use crate::domain::classification::ErrorKind;
    use serde_json::json;

    fn manager(transport: &MockTransport, store: &InMemoryKeyValueStore) -> AuthSessionManager {
        let executor = RequestExecutor::new(
            Arc::new(transport.clone()),
            Arc::new(RecordingBackoffTimer::new()),
        );
        let api = TextbookApiClient::new(executor, "http://api.test", "http://api.test/api/v1");
        AuthSessionManager::new(api, Arc::new(store.clone()))
    }

    fn token_reply() -> MockReply {
        MockReply::json(
            200,
            json!({"token": "tok-1", "user_id": 7, "username": "ada", "email": "ada@example.com"}),
        )
    }

    #[tokio::test]
    async fn login_persists_token_and_user() {
        let transport = MockTransport::new().with_reply(token_reply());
        let store = InMemoryKeyValueStore::new();
        let auth = manager(&transport, &store);

        let user = auth.login("ada", "secret").await.unwrap();

        assert_eq!(user.id, "7");
        assert!(auth.is_authenticated());
        assert_eq!(auth.bearer_token().unwrap().expose_secret(), "tok-1");
        assert_eq!(store.get(DEFAULT_TOKEN_KEY).unwrap().as_deref(), Some("tok-1"));
        assert!(store.get(DEFAULT_USER_KEY).unwrap().unwrap().contains("\"ada\""));
    }

    #[tokio::test]
    async fn login_failure_uses_backend_detail() {
        let transport = MockTransport::new()
            .with_reply(MockReply::json(401, json!({"detail": "Incorrect username or password"})));
        let store = InMemoryKeyValueStore::new();
        let auth = manager(&transport, &store);

        let error = auth.login("ada", "wrong").await.unwrap_err();

        assert_eq!(error.to_string(), "Incorrect username or password");
        assert_eq!(error.classification().kind(), ErrorKind::Auth);
        assert!(!auth.is_authenticated());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn blank_credentials_are_rejected_locally() {
        let transport = MockTransport::new();
        let auth = manager(&transport, &InMemoryKeyValueStore::new());

        let error = auth.login("", "secret").await.unwrap_err();

        assert!(matches!(error, AuthSessionError::InvalidInput(_)));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn register_signs_in_afterwards() {
        let transport = MockTransport::new()
            .with_reply(MockReply::json(201, json!({"id": 7})))
            .with_reply(token_reply());
        let auth = manager(&transport, &InMemoryKeyValueStore::new());

        let user = auth.register("ada", "ada@example.com", "secret").await.unwrap();

        assert_eq!(user.username, "ada");
        let calls = transport.calls();
        assert_eq!(calls[0].url, "http://api.test/api/v1/auth/register");
        assert_eq!(calls[1].url, "http://api.test/api/v1/auth/login");
    }

    #[tokio::test]
    async fn restore_survives_a_new_manager() {
        let transport = MockTransport::new().with_reply(token_reply());
        let store = InMemoryKeyValueStore::new();
        manager(&transport, &store).login("ada", "secret").await.unwrap();

        let reloaded = manager(&transport, &store);
        assert!(!reloaded.is_authenticated());

        let user = reloaded.restore().unwrap();
        assert_eq!(user.username, "ada");
        assert!(reloaded.is_authenticated());
    }

    #[test]
    fn corrupt_user_record_clears_everything() {
        let store = InMemoryKeyValueStore::new();
        store.set(DEFAULT_TOKEN_KEY, "tok-1").unwrap();
        store.set(DEFAULT_USER_KEY, "{not json").unwrap();
        let auth = manager(&MockTransport::new(), &store);

        assert!(auth.restore().is_none());
        assert!(store.get(DEFAULT_TOKEN_KEY).unwrap().is_none());
        assert!(store.get(DEFAULT_USER_KEY).unwrap().is_none());
    }

    /// Store that rejects writes to one key.
    struct RejectingStore {
        inner: InMemoryKeyValueStore,
        rejected_key: &'static str,
    }

    impl KeyValueStore for RejectingStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if key == self.rejected_key {
                return Err(StorageError::Unavailable("quota exceeded".to_string()));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn partial_write_leaves_nothing_behind() {
        for rejected_key in [DEFAULT_TOKEN_KEY, DEFAULT_USER_KEY] {
            let inner = InMemoryKeyValueStore::new();
            let executor = RequestExecutor::new(
                Arc::new(MockTransport::new()),
                Arc::new(RecordingBackoffTimer::new()),
            );
            let api = TextbookApiClient::new(executor, "http://api.test", "http://api.test/api/v1");
            let auth = AuthSessionManager::new(
                api,
                Arc::new(RejectingStore {
                    inner: inner.clone(),
                    rejected_key,
                }),
            );
            let reply: AuthTokenResponse = serde_json::from_value(
                json!({"token": "tok-1", "user_id": 7, "username": "ada"}),
            )
            .unwrap();

            assert!(matches!(auth.establish(&reply), Err(AuthSessionError::Storage(_))));
            assert!(!auth.is_authenticated());
            assert!(inner.is_empty(), "left data after rejecting {}", rejected_key);
        }
    }

    #[tokio::test]
    async fn logout_clears_storage() {
        let transport = MockTransport::new().with_reply(token_reply());
        let store = InMemoryKeyValueStore::new();
        let auth = manager(&transport, &store);
        auth.login("ada", "secret").await.unwrap();

        auth.logout();

        assert!(!auth.is_authenticated());
        assert!(auth.bearer_token().is_none());
        assert!(store.is_empty());
    }
}
