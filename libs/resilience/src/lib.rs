//! Resilience primitives shared by the feedback pipeline services.
//!
//! Currently this is the bounded retry policy used around durable-store
//! writes on the consumer side. Retries are deliberately linear and capped:
//! the consumer must resolve every message in bounded wall-clock time so the
//! partition never stalls.

pub mod retry;

pub use retry::{with_retry, RetryConfig, RetryError};
