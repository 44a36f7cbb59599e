//! Request/response contract validation.
//!
//! Each message kind exchanged with the backend has a static schema. The
//! validator checks a JSON payload against one of those schemas and reports
//! every violation it finds, in schema order, without touching the payload.

mod endpoint;
mod result;
mod schema;
mod schemas;
mod validator;

pub use endpoint::ApiEndpoint;
pub use result::{FieldError, ValidationResult};
pub use schema::{FieldSpec, FieldType, Schema};
pub use schemas::SchemaKind;
pub use validator::validate;
