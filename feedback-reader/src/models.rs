use chrono::{DateTime, Utc};
use event_schema::FeedbackAnalyzedEvent;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::error::ReaderError;

/// Analyzed feedback entity persisted in Postgres and projected into Redis.
///
/// Created exactly once per identity by the consumer, read many times,
/// never updated or deleted by this service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, Validate)]
pub struct AnalyzedFeedback {
    pub feedback_id: Uuid,

    #[validate(length(min = 1, message = "source is required"))]
    pub source: String,

    #[validate(length(min = 1, max = 500, message = "text must be 1-500 characters"))]
    pub text: String,

    #[validate(length(min = 1, max = 500, message = "keywords must hold 1-500 entries"))]
    pub keywords: Vec<String>,

    #[validate(length(min = 1, max = 255, message = "sentiment must be 1-255 characters"))]
    pub sentiment: String,

    pub feedback_timestamp: DateTime<Utc>,
}

impl TryFrom<FeedbackAnalyzedEvent> for AnalyzedFeedback {
    type Error = ReaderError;

    fn try_from(event: FeedbackAnalyzedEvent) -> Result<Self, Self::Error> {
        let feedback_timestamp = DateTime::from_timestamp(event.timestamp, 0).ok_or_else(|| {
            ReaderError::Validation(format!("timestamp {} out of range", event.timestamp))
        })?;

        Ok(Self {
            feedback_id: event.feedback_id,
            source: event.source,
            text: event.text,
            keywords: event.keywords,
            sentiment: event.sentiment,
            feedback_timestamp,
        })
    }
}
