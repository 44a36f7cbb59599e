use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Identity providers supported for social login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Facebook,
    Google,
}

impl OAuthProvider {
    pub fn all() -> &'static [OAuthProvider] {
        &[OAuthProvider::Facebook, OAuthProvider::Google]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::Facebook => "facebook",
            OAuthProvider::Google => "google",
        }
    }

    /// Path segment the provider redirects back to.
    pub fn callback_path(&self) -> &'static str {
        match self {
            OAuthProvider::Facebook => "/auth/facebook/callback",
            OAuthProvider::Google => "/auth/google/callback",
        }
    }

    /// Display name used in user-facing messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            OAuthProvider::Facebook => "Facebook",
            OAuthProvider::Google => "Google",
        }
    }
}

impl fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OAuthProvider {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "facebook" => Ok(OAuthProvider::Facebook),
            "google" => Ok(OAuthProvider::Google),
            other => Err(ValidationError::invalid_format(
                "provider",
                format!("unsupported OAuth provider '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Google".parse::<OAuthProvider>().unwrap(), OAuthProvider::Google);
        assert_eq!("facebook".parse::<OAuthProvider>().unwrap(), OAuthProvider::Facebook);
        assert!("github".parse::<OAuthProvider>().is_err());
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&OAuthProvider::Google).unwrap(), "\"google\"");
    }
}
