//! Retry policy - how many attempts a request gets and how long to wait
//! between them.

mod policy;

pub use policy::{RetryPolicy, RetryPolicyError, DEFAULT_RETRYABLE_STATUS_CODES};
