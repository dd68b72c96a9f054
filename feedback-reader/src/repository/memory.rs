//! In-memory repository fakes.
//!
//! Both fakes honor the same contracts as the production adapters: the store
//! upserts by identity, the cache is set-if-absent. The store counts reads
//! so tests can assert that a cache hit skipped it entirely.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{FeedbackCache, FeedbackRepository};
use crate::error::Result;
use crate::models::AnalyzedFeedback;

#[derive(Default)]
pub struct InMemoryFeedbackRepository {
    records: RwLock<HashMap<Uuid, AnalyzedFeedback>>,
    reads: AtomicUsize,
}

impl InMemoryFeedbackRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `get_by_id` calls served so far.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl FeedbackRepository for InMemoryFeedbackRepository {
    async fn upsert(&self, feedback: &AnalyzedFeedback) -> Result<()> {
        self.records
            .write()
            .await
            .insert(feedback.feedback_id, feedback.clone());
        Ok(())
    }

    async fn get_by_id(&self, feedback_id: Uuid) -> Result<Option<AnalyzedFeedback>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.records.read().await.get(&feedback_id).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryFeedbackCache {
    entries: RwLock<HashMap<Uuid, AnalyzedFeedback>>,
}

impl InMemoryFeedbackCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, feedback_id: Uuid) -> bool {
        self.entries.read().await.contains_key(&feedback_id)
    }
}

#[async_trait]
impl FeedbackCache for InMemoryFeedbackCache {
    async fn put(&self, feedback: &AnalyzedFeedback) -> Result<()> {
        self.entries
            .write()
            .await
            .entry(feedback.feedback_id)
            .or_insert_with(|| feedback.clone());
        Ok(())
    }

    async fn get(&self, feedback_id: Uuid) -> Result<Option<AnalyzedFeedback>> {
        Ok(self.entries.read().await.get(&feedback_id).cloned())
    }

    async fn invalidate(&self, feedback_id: Uuid) -> Result<()> {
        self.entries.write().await.remove(&feedback_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample(feedback_id: Uuid, sentiment: &str) -> AnalyzedFeedback {
        AnalyzedFeedback {
            feedback_id,
            source: "email".to_string(),
            text: "Great support".to_string(),
            keywords: vec!["support".to_string()],
            sentiment: sentiment.to_string(),
            feedback_timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_store_upsert_replaces_by_identity() {
        let store = InMemoryFeedbackRepository::new();
        let feedback_id = Uuid::new_v4();

        store.upsert(&sample(feedback_id, "neutral")).await.unwrap();
        store.upsert(&sample(feedback_id, "positive")).await.unwrap();

        assert_eq!(store.len().await, 1);
        let record = store.get_by_id(feedback_id).await.unwrap().unwrap();
        assert_eq!(record.sentiment, "positive");
    }

    #[tokio::test]
    async fn test_cache_put_is_set_if_absent() {
        let cache = InMemoryFeedbackCache::new();
        let feedback_id = Uuid::new_v4();

        cache.put(&sample(feedback_id, "positive")).await.unwrap();
        cache.put(&sample(feedback_id, "negative")).await.unwrap();

        let entry = cache.get(feedback_id).await.unwrap().unwrap();
        assert_eq!(entry.sentiment, "positive");
    }

    #[tokio::test]
    async fn test_cache_invalidate_drops_the_entry() {
        let cache = InMemoryFeedbackCache::new();
        let feedback_id = Uuid::new_v4();

        cache.put(&sample(feedback_id, "positive")).await.unwrap();
        cache.invalidate(feedback_id).await.unwrap();

        assert!(cache.get(feedback_id).await.unwrap().is_none());
    }
}
