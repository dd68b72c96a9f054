//! Cache-aside read path for analyzed feedback.

use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{ReaderError, Result};
use crate::metrics::ReaderMetrics;
use crate::models::AnalyzedFeedback;
use crate::repository::{FeedbackCache, FeedbackRepository};

pub struct GetFeedbackByIdHandler {
    store: Arc<dyn FeedbackRepository>,
    cache: Arc<dyn FeedbackCache>,
    metrics: Arc<ReaderMetrics>,
}

impl GetFeedbackByIdHandler {
    pub fn new(
        store: Arc<dyn FeedbackRepository>,
        cache: Arc<dyn FeedbackCache>,
        metrics: Arc<ReaderMetrics>,
    ) -> Self {
        Self {
            store,
            cache,
            metrics,
        }
    }

    /// Cache first; on miss (or cache error) fall back to the store and
    /// repopulate the cache best-effort. Concurrent misses may both write
    /// the cache, which is harmless: the entity is write-once and the
    /// populate is set-if-absent.
    pub async fn handle(&self, feedback_id: Uuid) -> Result<AnalyzedFeedback> {
        match self.cache.get(feedback_id).await {
            Ok(Some(feedback)) => {
                debug!(feedback_id = %feedback_id, "cache hit");
                self.metrics.cache_hits.inc();
                return Ok(feedback);
            }
            Ok(None) => {}
            Err(e) => {
                // A degraded cache must not fail the read.
                warn!(feedback_id = %feedback_id, "cache lookup failed: {}", e);
            }
        }

        self.metrics.cache_misses.inc();

        let feedback = self
            .store
            .get_by_id(feedback_id)
            .await?
            .ok_or_else(|| ReaderError::NotFound(feedback_id.to_string()))?;

        if let Err(e) = self.cache.put(&feedback).await {
            warn!(feedback_id = %feedback_id, "cache populate failed: {}", e);
        }

        Ok(feedback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryFeedbackCache, InMemoryFeedbackRepository};
    use async_trait::async_trait;
    use chrono::Utc;
    use prometheus::Registry;

    fn sample_feedback() -> AnalyzedFeedback {
        AnalyzedFeedback {
            feedback_id: Uuid::new_v4(),
            source: "email".to_string(),
            text: "Great support".to_string(),
            keywords: vec!["support".to_string()],
            sentiment: "positive".to_string(),
            feedback_timestamp: Utc::now(),
        }
    }

    fn test_metrics() -> Arc<ReaderMetrics> {
        Arc::new(ReaderMetrics::new(&Registry::new()).unwrap())
    }

    #[tokio::test]
    async fn test_cache_hit_skips_the_store() {
        let store = Arc::new(InMemoryFeedbackRepository::new());
        let cache = Arc::new(InMemoryFeedbackCache::new());
        let metrics = test_metrics();

        let feedback = sample_feedback();
        cache.put(&feedback).await.unwrap();

        let handler = GetFeedbackByIdHandler::new(store.clone(), cache, metrics.clone());
        let result = handler.handle(feedback.feedback_id).await.unwrap();

        assert_eq!(result, feedback);
        assert_eq!(store.read_count(), 0);
        assert_eq!(metrics.cache_hits.get(), 1);
    }

    #[tokio::test]
    async fn test_read_through_populates_the_cache() {
        let store = Arc::new(InMemoryFeedbackRepository::new());
        let cache = Arc::new(InMemoryFeedbackCache::new());
        let metrics = test_metrics();

        let feedback = sample_feedback();
        store.upsert(&feedback).await.unwrap();

        let handler = GetFeedbackByIdHandler::new(store.clone(), cache.clone(), metrics.clone());
        let result = handler.handle(feedback.feedback_id).await.unwrap();

        assert_eq!(result, feedback);
        assert!(cache.contains(feedback.feedback_id).await);
        assert_eq!(metrics.cache_misses.get(), 1);
        assert_eq!(store.read_count(), 1);
    }

    #[tokio::test]
    async fn test_absent_everywhere_is_not_found() {
        let handler = GetFeedbackByIdHandler::new(
            Arc::new(InMemoryFeedbackRepository::new()),
            Arc::new(InMemoryFeedbackCache::new()),
            test_metrics(),
        );

        let err = handler.handle(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ReaderError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_cache_error_falls_back_to_the_store() {
        struct BrokenCache;

        #[async_trait]
        impl FeedbackCache for BrokenCache {
            async fn put(&self, _feedback: &AnalyzedFeedback) -> Result<()> {
                Err(ReaderError::Internal("cache down".to_string()))
            }
            async fn get(&self, _feedback_id: Uuid) -> Result<Option<AnalyzedFeedback>> {
                Err(ReaderError::Internal("cache down".to_string()))
            }
            async fn invalidate(&self, _feedback_id: Uuid) -> Result<()> {
                Err(ReaderError::Internal("cache down".to_string()))
            }
        }

        let store = Arc::new(InMemoryFeedbackRepository::new());
        let feedback = sample_feedback();
        store.upsert(&feedback).await.unwrap();

        let handler =
            GetFeedbackByIdHandler::new(store.clone(), Arc::new(BrokenCache), test_metrics());
        let result = handler.handle(feedback.feedback_id).await.unwrap();

        assert_eq!(result, feedback);
    }
}
