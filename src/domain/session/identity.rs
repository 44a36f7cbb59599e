use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::foundation::{to_base36, Timestamp, ValidationError};

const RANDOM_SUFFIX_LEN: usize = 5;

/// Opaque session identifier.
///
/// Generated ids look like `session_<base36 ms>_<5 base36 chars>`, but ids
/// adopted from the backend are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generates a fresh id stamped with `at`.
    pub fn generate(at: Timestamp) -> Self {
        let millis = at.as_unix_millis().max(0) as u128;
        Self(format!("session_{}_{}", to_base36(millis), random_suffix()))
    }

    /// Wraps an existing id, rejecting blank values.
    pub fn parse(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::empty_field("session_id"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn random_suffix() -> String {
    let digits = to_base36(Uuid::new_v4().as_u128());
    let tail = &digits[digits.len().saturating_sub(RANDOM_SUFFIX_LEN)..];
    format!("{:0>width$}", tail, width = RANDOM_SUFFIX_LEN)
}

/// The active conversation session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub created_at: Timestamp,
}

impl Session {
    pub fn new(id: SessionId, created_at: Timestamp) -> Self {
        Self { id, created_at }
    }

    /// Starts a new session with a generated id.
    pub fn start() -> Self {
        let now = Timestamp::now();
        Self::new(SessionId::generate(now), now)
    }
}
