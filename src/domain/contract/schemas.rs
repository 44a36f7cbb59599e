//! The closed set of message schemas exchanged with the backend.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::schema::{FieldSpec, Schema};

/// Message kinds with a known contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SchemaKind {
    ChatRequest,
    ChatResponse,
    HealthResponse,
    IngestionResponse,
}

impl SchemaKind {
    pub fn all() -> &'static [SchemaKind] {
        &[
            SchemaKind::ChatRequest,
            SchemaKind::ChatResponse,
            SchemaKind::HealthResponse,
            SchemaKind::IngestionResponse,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaKind::ChatRequest => "chatRequest",
            SchemaKind::ChatResponse => "chatResponse",
            SchemaKind::HealthResponse => "healthResponse",
            SchemaKind::IngestionResponse => "ingestionResponse",
        }
    }

    pub fn schema(&self) -> &'static Schema {
        match self {
            SchemaKind::ChatRequest => &CHAT_REQUEST,
            SchemaKind::ChatResponse => &CHAT_RESPONSE,
            SchemaKind::HealthResponse => &HEALTH_RESPONSE,
            SchemaKind::IngestionResponse => &INGESTION_RESPONSE,
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static HEALTH_STATUS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new("^(healthy|unhealthy)$").expect("health status pattern is a valid regex"));

static CHAT_REQUEST: Lazy<Schema> = Lazy::new(|| {
    Schema::new(&["message"])
        .field("message", FieldSpec::string().min_length(1).max_length(10_000))
        .field("selected_text", FieldSpec::string().max_length(5_000))
        .field("session_id", FieldSpec::string().min_length(1))
});

static CHAT_RESPONSE: Lazy<Schema> = Lazy::new(|| {
    Schema::new(&["response", "session_id"])
        .field("response", FieldSpec::string().min_length(1))
        .field("session_id", FieldSpec::string().min_length(1))
        .field(
            "sources",
            FieldSpec::array()
                .max_items(100)
                .items(FieldSpec::string().required().min_length(1).max_length(500)),
        )
        .field("mode", FieldSpec::string())
        .field("retrieved_chunks_count", FieldSpec::number().integer().min(0.0))
        .field("response_time", FieldSpec::number())
});

static HEALTH_RESPONSE: Lazy<Schema> = Lazy::new(|| {
    Schema::new(&["status", "timestamp"])
        .field(
            "status",
            FieldSpec::string().pattern(HEALTH_STATUS_PATTERN.clone()),
        )
        .field("timestamp", FieldSpec::string().min_length(1))
        .field("dependencies", FieldSpec::object())
});

static INGESTION_RESPONSE: Lazy<Schema> = Lazy::new(|| {
    Schema::new(&["status"])
        .field("status", FieldSpec::string().min_length(1))
        .field("pages_processed", FieldSpec::number().integer().min(0.0))
        .field("chunks_created", FieldSpec::number().integer().min(0.0))
        .field("message", FieldSpec::string())
});
