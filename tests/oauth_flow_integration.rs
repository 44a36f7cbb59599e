//! Integration tests for the social-login handshake across a page reload.
//!
//! The reload is modelled by dropping the client state and reopening the
//! same file-backed store from a fresh one:
//! 1. `initiate` persists the state token and redirects
//! 2. A new client lands on the provider callback and recovers the pending
//!    handshake from storage
//! 3. The code exchange establishes the auth session, or a forged state
//!    leaves nothing behind

use reqwest::Url;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use textbook_chat_client::adapters::{
    FileKeyValueStore, InMemoryNavigator, MockReply, MockTransport, RecordingBackoffTimer,
};
use textbook_chat_client::application::services::OAuthError;
use textbook_chat_client::ports::Navigator;
use textbook_chat_client::application::{ChatClientPorts, ChatClientState, PageLoad};
use textbook_chat_client::config::ClientConfig;
use textbook_chat_client::domain::oauth::{OAuthFlowStatus, OAuthProvider};
use textbook_chat_client::ports::KeyValueStore;

// =============================================================================
// Test Infrastructure
// =============================================================================

fn boot(path: &Path, transport: &MockTransport, navigator: &InMemoryNavigator) -> ChatClientState {
    let ports = ChatClientPorts {
        transport: Arc::new(transport.clone()),
        store: Arc::new(FileKeyValueStore::open(path).unwrap()),
        navigator: Arc::new(navigator.clone()),
        timer: Arc::new(RecordingBackoffTimer::new()),
    };
    ChatClientState::from_config(&ClientConfig::default(), ports).unwrap()
}

fn reopen(path: &Path) -> FileKeyValueStore {
    FileKeyValueStore::open(path).unwrap()
}

async fn begin_google_login(dir: &TempDir) -> (PathBuf, InMemoryNavigator) {
    let path = dir.path().join("local-storage.json");
    let navigator = InMemoryNavigator::at("http://localhost:3000/docs/intro").unwrap();
    let transport = MockTransport::new().with_reply(MockReply::json(
        200,
        json!({
            "auth_url": "https://accounts.google.com/o/oauth2/v2/auth?client_id=abc",
            "state": "csrf-42"
        }),
    ));

    let client = boot(&path, &transport, &navigator);
    let target = client.oauth.initiate(OAuthProvider::Google).await.unwrap();
    assert_eq!(target.host_str(), Some("accounts.google.com"));
    (path, navigator)
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn initiate_survives_reload() {
    let dir = TempDir::new().unwrap();
    let (path, navigator) = begin_google_login(&dir).await;

    assert_eq!(reopen(&path).get("oauth_state").unwrap().as_deref(), Some("csrf-42"));

    let reloaded = boot(&path, &MockTransport::new(), &navigator);
    assert_eq!(reloaded.oauth.status(), OAuthFlowStatus::AwaitingCallback);
}

#[tokio::test]
async fn callback_completes_login_after_reload() {
    let dir = TempDir::new().unwrap();
    let (path, navigator) = begin_google_login(&dir).await;

    navigator.land_on(
        Url::parse("http://localhost:3000/auth/google/callback?code=auth-code&state=csrf-42")
            .unwrap(),
    );
    let transport = MockTransport::new().with_reply(MockReply::json(
        200,
        json!({
            "token": "jwt-abc",
            "user_id": 12,
            "username": "ada",
            "email": "ada@example.com",
            "is_new_user": true
        }),
    ));
    let reloaded = boot(&path, &transport, &navigator);

    let user = reloaded.oauth.handle_callback().await.unwrap().unwrap();

    assert_eq!(user.id, "12");
    assert_eq!(user.is_new_user, Some(true));
    assert_eq!(reloaded.oauth.status(), OAuthFlowStatus::Completed);
    assert!(reloaded.auth.is_authenticated());
    assert_eq!(
        navigator.current_location().as_str(),
        "http://localhost:3000/auth/google/callback"
    );

    let call = transport.last_call().unwrap();
    assert_eq!(call.url, "http://localhost:8000/api/v1/oauth/google");
    let sent: serde_json::Value = serde_json::from_str(call.body.as_deref().unwrap()).unwrap();
    assert_eq!(sent["redirect_uri"], "http://localhost:3000");

    let disk = reopen(&path);
    assert!(disk.get("oauth_state").unwrap().is_none());
    assert_eq!(disk.get("textbook_token").unwrap().as_deref(), Some("jwt-abc"));
}

#[tokio::test]
async fn forged_state_leaves_no_token() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("local-storage.json");
    reopen(&path).set("oauth_state", "csrf-42").unwrap();

    let navigator = InMemoryNavigator::at(
        "http://localhost:3000/auth/facebook/callback?code=auth-code&state=attacker",
    )
    .unwrap();
    let transport = MockTransport::new();
    let client = boot(&path, &transport, &navigator);

    let result = client.oauth.handle_callback().await.unwrap();

    assert!(matches!(result, Err(OAuthError::StateMismatch)));
    assert_eq!(client.oauth.status(), OAuthFlowStatus::Failed);
    assert_eq!(transport.call_count(), 0);
    assert!(!client.auth.is_authenticated());

    let disk = reopen(&path);
    assert!(disk.get("oauth_state").unwrap().is_none());
    assert!(disk.get("textbook_token").unwrap().is_none());
}

#[tokio::test]
async fn failed_exchange_clears_state_and_keeps_user_signed_out() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("local-storage.json");
    reopen(&path).set("oauth_state", "csrf-42").unwrap();

    let navigator = InMemoryNavigator::at(
        "http://localhost:3000/auth/google/callback?code=used-code&state=csrf-42",
    )
    .unwrap();
    let transport = MockTransport::new().always(MockReply::json(
        400,
        json!({"detail": "Authorization code already used"}),
    ));
    let client = boot(&path, &transport, &navigator);

    let error = client.oauth.handle_callback().await.unwrap().unwrap_err();

    assert_eq!(error.to_string(), "Authorization code already used");
    assert_eq!(transport.call_count(), 1);
    assert!(reopen(&path).get("oauth_state").unwrap().is_none());
    assert!(!client.auth.is_authenticated());
}

fn seed_previous_login(path: &Path) {
    let disk = reopen(path);
    disk.set("textbook_token", "old-token").unwrap();
    disk.set("textbook_user", r#"{"id":"1","username":"old"}"#).unwrap();
}

#[tokio::test]
async fn ordinary_page_load_restores_previous_login() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("local-storage.json");
    seed_previous_login(&path);
    let navigator = InMemoryNavigator::at("http://localhost:3000/docs/intro").unwrap();
    let client = boot(&path, &MockTransport::new(), &navigator);

    match client.on_page_load().await {
        PageLoad::Restored(Some(user)) => assert_eq!(user.username, "old"),
        other => panic!("unexpected page load outcome: {:?}", other),
    }
    assert!(client.auth.is_authenticated());
}

#[tokio::test]
async fn callback_page_load_checks_handshake_before_restoring() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("local-storage.json");
    seed_previous_login(&path);
    reopen(&path).set("oauth_state", "csrf-42").unwrap();
    let navigator =
        InMemoryNavigator::at("http://localhost:3000/auth/google/callback?code=c&state=forged")
            .unwrap();
    let transport = MockTransport::new();
    let client = boot(&path, &transport, &navigator);

    assert!(!client.auth.is_authenticated());

    match client.on_page_load().await {
        PageLoad::Callback(Err(OAuthError::StateMismatch)) => {}
        other => panic!("unexpected page load outcome: {:?}", other),
    }
    assert!(!client.auth.is_authenticated());
    assert!(client.auth.user().is_none());
    assert_eq!(transport.call_count(), 0);

    let disk = reopen(&path);
    assert!(disk.get("textbook_token").unwrap().is_none());
    assert!(disk.get("oauth_state").unwrap().is_none());
}

#[tokio::test]
async fn callback_page_load_replaces_previous_login() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("local-storage.json");
    seed_previous_login(&path);
    reopen(&path).set("oauth_state", "csrf-42").unwrap();
    let navigator =
        InMemoryNavigator::at("http://localhost:3000/auth/google/callback?code=c&state=csrf-42")
            .unwrap();
    let transport = MockTransport::new().with_reply(MockReply::json(
        200,
        json!({"token": "new-token", "user_id": 2, "username": "ada"}),
    ));
    let client = boot(&path, &transport, &navigator);

    match client.on_page_load().await {
        PageLoad::Callback(Ok(user)) => assert_eq!(user.username, "ada"),
        other => panic!("unexpected page load outcome: {:?}", other),
    }
    assert_eq!(
        reopen(&path).get("textbook_token").unwrap().as_deref(),
        Some("new-token")
    );
}
