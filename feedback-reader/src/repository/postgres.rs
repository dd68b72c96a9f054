use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::FeedbackRepository;
use crate::error::Result;
use crate::models::AnalyzedFeedback;

/// Postgres adapter for the durable feedback store.
pub struct PostgresFeedbackRepository {
    pool: PgPool,
}

impl PostgresFeedbackRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FeedbackRepository for PostgresFeedbackRepository {
    async fn upsert(&self, feedback: &AnalyzedFeedback) -> Result<()> {
        // Redelivered messages land here again; the conflict arm keeps the
        // write idempotent per identity.
        sqlx::query(
            r#"
            INSERT INTO analyzed_feedback (
                feedback_id, source, text, keywords, sentiment, feedback_timestamp
            ) VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (feedback_id) DO UPDATE SET
                source = EXCLUDED.source,
                text = EXCLUDED.text,
                keywords = EXCLUDED.keywords,
                sentiment = EXCLUDED.sentiment,
                feedback_timestamp = EXCLUDED.feedback_timestamp
            "#,
        )
        .bind(feedback.feedback_id)
        .bind(&feedback.source)
        .bind(&feedback.text)
        .bind(&feedback.keywords)
        .bind(&feedback.sentiment)
        .bind(feedback.feedback_timestamp)
        .execute(&self.pool)
        .await?;

        debug!(feedback_id = %feedback.feedback_id, "upserted analyzed feedback");
        Ok(())
    }

    async fn get_by_id(&self, feedback_id: Uuid) -> Result<Option<AnalyzedFeedback>> {
        let feedback = sqlx::query_as::<_, AnalyzedFeedback>(
            r#"
            SELECT feedback_id, source, text, keywords, sentiment, feedback_timestamp
            FROM analyzed_feedback
            WHERE feedback_id = $1
            "#,
        )
        .bind(feedback_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(feedback)
    }
}
