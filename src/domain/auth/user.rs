use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// The user record persisted next to the bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_new_user: Option<bool>,
}

/// Successful login, register-then-login, or OAuth exchange reply.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthTokenResponse {
    pub token: String,
    #[serde(deserialize_with = "string_or_number")]
    pub user_id: String,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub is_new_user: Option<bool>,
}

impl AuthTokenResponse {
    pub fn user(&self) -> AuthenticatedUser {
        AuthenticatedUser {
            id: self.user_id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            is_new_user: self.is_new_user,
        }
    }
}

/// Per-user reading preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreferences {
    pub language: String,
    pub personalization_enabled: bool,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            personalization_enabled: false,
        }
    }
}

/// Backends disagree on whether user ids are numbers or strings.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_user_ids_are_accepted() {
        let response: AuthTokenResponse = serde_json::from_value(json!({
            "token": "t",
            "user_id": 42,
            "username": "ada",
        }))
        .unwrap();
        assert_eq!(response.user().id, "42");
        assert_eq!(response.user().email, None);
    }

    #[test]
    fn persisted_user_round_trips_without_optional_fields() {
        let user = AuthenticatedUser {
            id: "7".into(),
            username: "ada".into(),
            email: None,
            is_new_user: None,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json, json!({"id": "7", "username": "ada"}));
    }

    #[test]
    fn rejects_non_scalar_ids() {
        let result: Result<AuthenticatedUser, _> =
            serde_json::from_value(json!({"id": [1], "username": "ada"}));
        assert!(result.is_err());
    }
}
