use secrecy::{ExposeSecret, Secret};
use serde_json::{json, Value};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Username/password pair. The password never appears in `Debug` output.
pub struct LoginCredentials {
    pub username: String,
    password: Secret<String>,
}

impl LoginCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Result<Self, ValidationError> {
        let username = username.into();
        let password = password.into();
        if username.trim().is_empty() {
            return Err(ValidationError::empty_field("username"));
        }
        if password.is_empty() {
            return Err(ValidationError::empty_field("password"));
        }
        Ok(Self {
            username,
            password: Secret::new(password),
        })
    }

    /// Request body for the login endpoint.
    pub fn to_body(&self) -> Value {
        json!({
            "username": self.username,
            "password": self.password.expose_secret(),
        })
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// New account details.
pub struct Registration {
    pub username: String,
    pub email: String,
    password: Secret<String>,
}

impl Registration {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let username = username.into();
        let email = email.into();
        let password = password.into();
        if username.trim().is_empty() {
            return Err(ValidationError::empty_field("username"));
        }
        if !email.contains('@') {
            return Err(ValidationError::invalid_format("email", "must contain '@'"));
        }
        if password.is_empty() {
            return Err(ValidationError::empty_field("password"));
        }
        Ok(Self {
            username,
            email,
            password: Secret::new(password),
        })
    }

    pub fn to_body(&self) -> Value {
        json!({
            "username": self.username,
            "email": self.email,
            "password": self.password.expose_secret(),
        })
    }

    /// Credentials for the automatic login that follows registration.
    pub fn credentials(&self) -> LoginCredentials {
        LoginCredentials {
            username: self.username.clone(),
            password: Secret::new(self.password.expose_secret().clone()),
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_password() {
        let creds = LoginCredentials::new("ada", "hunter2").unwrap();
        let debug = format!("{:?}", creds);
        assert!(debug.contains("ada"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn body_carries_password() {
        let creds = LoginCredentials::new("ada", "hunter2").unwrap();
        assert_eq!(creds.to_body()["password"], "hunter2");
    }

    #[test]
    fn rejects_blank_fields() {
        assert!(LoginCredentials::new(" ", "pw").is_err());
        assert!(LoginCredentials::new("ada", "").is_err());
        assert!(Registration::new("ada", "not-an-email", "pw").is_err());
    }

    #[test]
    fn registration_yields_matching_credentials() {
        let reg = Registration::new("ada", "ada@example.com", "pw").unwrap();
        assert_eq!(reg.credentials().to_body()["username"], "ada");
        assert_eq!(reg.to_body()["email"], "ada@example.com");
    }
}
