use async_trait::async_trait;
use redis::aio::ConnectionManager;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use super::FeedbackCache;
use crate::error::{ReaderError, Result};
use crate::models::AnalyzedFeedback;

/// Shared Redis connection manager
pub type SharedRedis = Arc<Mutex<ConnectionManager>>;

/// Redis adapter for the analyzed-feedback cache.
///
/// Entries are JSON under `{prefix}:{feedback_id}` and written SET NX with
/// no TTL: the entity is immutable once analyzed, so an existing entry never
/// needs refreshing.
pub struct RedisFeedbackCache {
    redis: SharedRedis,
    key_prefix: String,
}

impl RedisFeedbackCache {
    pub fn new(redis: SharedRedis, key_prefix: impl Into<String>) -> Self {
        Self {
            redis,
            key_prefix: key_prefix.into(),
        }
    }

    fn key(&self, feedback_id: Uuid) -> String {
        format!("{}:{}", self.key_prefix, feedback_id)
    }
}

#[async_trait]
impl FeedbackCache for RedisFeedbackCache {
    async fn put(&self, feedback: &AnalyzedFeedback) -> Result<()> {
        let key = self.key(feedback.feedback_id);
        let json = serde_json::to_string(feedback)
            .map_err(|e| ReaderError::Internal(format!("cache serialization failed: {e}")))?;

        let mut conn = self.redis.lock().await;
        let _: Option<String> = redis::cmd("SET")
            .arg(&key)
            .arg(&json)
            .arg("NX")
            .query_async(&mut *conn)
            .await?;

        debug!(key = %key, "cache populate");
        Ok(())
    }

    async fn get(&self, feedback_id: Uuid) -> Result<Option<AnalyzedFeedback>> {
        let key = self.key(feedback_id);

        let mut conn = self.redis.lock().await;
        let cached: Option<String> = redis::cmd("GET")
            .arg(&key)
            .query_async(&mut *conn)
            .await?;

        match cached {
            Some(json) => {
                let feedback = serde_json::from_str(&json).map_err(|e| {
                    ReaderError::Internal(format!("cache deserialization failed: {e}"))
                })?;
                Ok(Some(feedback))
            }
            None => Ok(None),
        }
    }

    async fn invalidate(&self, feedback_id: Uuid) -> Result<()> {
        let key = self.key(feedback_id);

        let mut conn = self.redis.lock().await;
        let _: () = redis::cmd("DEL").arg(&key).query_async(&mut *conn).await?;

        debug!(key = %key, "cache invalidate");
        Ok(())
    }
}
