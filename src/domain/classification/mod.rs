//! Error classification - maps raw transport/protocol failures to
//! user-actionable categories.
//!
//! Classification is purely advisory: nothing in this module raises. Callers
//! decide whether to retry, surface, or degrade based on the result.

mod taxonomy;
mod failure;

pub use taxonomy::{
    classify, is_content_not_found, is_network, is_rate_limit, ErrorClassification, ErrorKind,
    Severity, UserFacingError, DEFAULT_RATE_LIMIT_WAIT,
};
pub use failure::{parse_retry_after, RawFailure, CONTENT_NOT_FOUND_MARKER};
