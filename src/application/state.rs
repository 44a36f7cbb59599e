//! Shared client state - every service built once from configuration.

use std::sync::Arc;

use crate::adapters::{
    FileKeyValueStore, InMemoryKeyValueStore, ReqwestTransport, TokioBackoffTimer,
};
use crate::application::handlers::{ClearChatHandler, SendChatMessageHandler};
use crate::application::services::{
    AuthSessionManager, OAuthError, OAuthFlowController, RequestExecutor, SelectionCache,
    SessionIdentityManager, TextbookApiClient,
};
use crate::domain::auth::AuthenticatedUser;
use crate::config::{ClientConfig, ValidationError};
use crate::ports::{BackoffTimer, HttpTransport, KeyValueStore, Navigator, StorageError};

/// The outside world the client runs against.
#[derive(Clone)]
pub struct ChatClientPorts {
    pub transport: Arc<dyn HttpTransport>,
    pub store: Arc<dyn KeyValueStore>,
    pub navigator: Arc<dyn Navigator>,
    pub timer: Arc<dyn BackoffTimer>,
}

impl ChatClientPorts {
    /// Real network and timer. Storage is file-backed when a path is
    /// configured and in-memory otherwise.
    pub fn standard(config: &ClientConfig, navigator: Arc<dyn Navigator>) -> Result<Self, StorageError> {
        let store: Arc<dyn KeyValueStore> = match &config.storage.file_path {
            Some(path) => Arc::new(FileKeyValueStore::open(path)?),
            None => Arc::new(InMemoryKeyValueStore::new()),
        };
        Ok(Self {
            transport: Arc::new(ReqwestTransport::new(config.api.request_timeout())),
            store,
            navigator,
            timer: Arc::new(TokioBackoffTimer),
        })
    }
}

/// What happened to the signed-in identity when the page loaded.
#[derive(Debug)]
pub enum PageLoad {
    /// The page was a provider callback and the handshake ran.
    Callback(Result<AuthenticatedUser, OAuthError>),
    /// Ordinary page: the persisted login, if any, was restored.
    Restored(Option<AuthenticatedUser>),
}

/// Services shared by the chat widget.
#[derive(Clone)]
pub struct ChatClientState {
    pub api: TextbookApiClient,
    pub sessions: Arc<SessionIdentityManager>,
    pub auth: Arc<AuthSessionManager>,
    pub oauth: Arc<OAuthFlowController>,
    pub selection: Arc<SelectionCache>,
}

impl ChatClientState {
    /// Validates `config` and wires the services over `ports`.
    pub fn from_config(config: &ClientConfig, ports: ChatClientPorts) -> Result<Self, ValidationError> {
        config.validate()?;

        let executor = RequestExecutor::new(ports.transport, ports.timer)
            .with_default_policy(config.retry.to_policy()?);
        let api = TextbookApiClient::new(executor, config.base_url(), config.auth_base_url());

        let storage = &config.storage;
        let sessions = Arc::new(SessionIdentityManager::with_key(
            ports.store.clone(),
            storage.session_key.clone(),
        ));
        let auth = Arc::new(
            AuthSessionManager::new(api.clone(), ports.store.clone())
                .with_keys(storage.token_key.clone(), storage.user_key.clone()),
        );

        let mut oauth = OAuthFlowController::new(
            api.clone(),
            auth.clone(),
            ports.store.clone(),
            ports.navigator,
        )
        .with_state_key(storage.oauth_state_key.clone());
        if let Some(uri) = &config.oauth.redirect_uri {
            oauth = oauth.with_redirect_uri(uri.clone());
        }

        let selection = Arc::new(
            SelectionCache::new(ports.store)
                .with_key(storage.selection_key.clone())
                .with_ttl(storage.selection_ttl()),
        );

        Ok(Self {
            api,
            sessions,
            auth,
            oauth: Arc::new(oauth),
            selection,
        })
    }

    /// Runs once per page load. A provider callback takes precedence over the
    /// persisted login; a callback that fails leaves the reader signed out.
    pub async fn on_page_load(&self) -> PageLoad {
        match self.oauth.handle_callback().await {
            Some(Ok(user)) => PageLoad::Callback(Ok(user)),
            Some(Err(e)) => {
                self.auth.logout();
                PageLoad::Callback(Err(e))
            }
            None => PageLoad::Restored(self.auth.restore()),
        }
    }

    pub fn send_message_handler(&self) -> SendChatMessageHandler {
        SendChatMessageHandler::new(self.api.clone(), self.sessions.clone())
    }

    pub fn clear_chat_handler(&self) -> ClearChatHandler {
        ClearChatHandler::new(self.sessions.clone())
    }
}
