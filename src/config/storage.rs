//! Persistence key configuration

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_session_key")]
    pub session_key: String,

    #[serde(default = "default_token_key")]
    pub token_key: String,

    #[serde(default = "default_user_key")]
    pub user_key: String,

    #[serde(default = "default_oauth_state_key")]
    pub oauth_state_key: String,

    #[serde(default = "default_selection_key")]
    pub selection_key: String,

    #[serde(default = "default_selection_ttl")]
    pub selection_ttl_secs: u64,

    /// JSON file backing the key-value store. In-memory when unset.
    pub file_path: Option<PathBuf>,
}

impl StorageConfig {
    pub fn selection_ttl(&self) -> Duration {
        Duration::from_secs(self.selection_ttl_secs)
    }

    /// Validate storage configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let keys = [
            ("storage.session_key", &self.session_key),
            ("storage.token_key", &self.token_key),
            ("storage.user_key", &self.user_key),
            ("storage.oauth_state_key", &self.oauth_state_key),
            ("storage.selection_key", &self.selection_key),
        ];
        for (name, value) in keys {
            if value.trim().is_empty() {
                return Err(ValidationError::EmptyStorageKey(name));
            }
        }
        if self.selection_ttl_secs == 0 {
            return Err(ValidationError::InvalidSelectionTtl);
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            session_key: default_session_key(),
            token_key: default_token_key(),
            user_key: default_user_key(),
            oauth_state_key: default_oauth_state_key(),
            selection_key: default_selection_key(),
            selection_ttl_secs: default_selection_ttl(),
            file_path: None,
        }
    }
}

fn default_session_key() -> String {
    "chatbot-session".to_string()
}

fn default_token_key() -> String {
    "textbook_token".to_string()
}

fn default_user_key() -> String {
    "textbook_user".to_string()
}

fn default_oauth_state_key() -> String {
    "oauth_state".to_string()
}

fn default_selection_key() -> String {
    "chatbot_selected_text".to_string()
}

fn default_selection_ttl() -> u64 {
    3600
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = StorageConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.selection_ttl(), Duration::from_secs(3600));
    }

    #[test]
    fn empty_key_is_rejected() {
        let config = StorageConfig {
            token_key: " ".into(),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::EmptyStorageKey("storage.token_key"))
        );
    }
}
