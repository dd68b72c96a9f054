//! Repository contracts for the analyzed-feedback read model.
//!
//! Two capability sets with independent failure modes: the durable store
//! (source of truth, keyed by identity) and the cache (non-authoritative
//! projection of the same key space). Production adapters and the in-memory
//! fakes both satisfy the traits, so the consumer and query handler can be
//! exercised without infrastructure.

mod memory;
mod postgres;
mod redis_cache;

pub use memory::{InMemoryFeedbackCache, InMemoryFeedbackRepository};
pub use postgres::PostgresFeedbackRepository;
pub use redis_cache::{RedisFeedbackCache, SharedRedis};

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::AnalyzedFeedback;

/// Durable store for analyzed feedback.
#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    /// Write a record keyed by identity.
    ///
    /// Must tolerate being applied twice for the same identity without
    /// producing duplicate or divergent records; redelivered messages hit
    /// this path.
    async fn upsert(&self, feedback: &AnalyzedFeedback) -> Result<()>;

    /// Read a record by identity. `None` means the identity was never
    /// written, which is not an infrastructure failure.
    async fn get_by_id(&self, feedback_id: Uuid) -> Result<Option<AnalyzedFeedback>>;
}

/// Cache projection of the analyzed-feedback store.
#[async_trait]
pub trait FeedbackCache: Send + Sync {
    /// Populate the cache for an identity. Set-if-absent: an existing entry
    /// is left untouched, which is safe because the entity is write-once.
    async fn put(&self, feedback: &AnalyzedFeedback) -> Result<()>;

    /// Read a cached record by identity.
    async fn get(&self, feedback_id: Uuid) -> Result<Option<AnalyzedFeedback>>;

    /// Drop the cached entry for an identity.
    async fn invalidate(&self, feedback_id: Uuid) -> Result<()>;
}
