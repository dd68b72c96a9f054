use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::GatewayError;
use crate::grpc_client::Feedback;

/// Inbound feedback submission.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateFeedbackRequest {
    #[validate(length(min = 1, max = 500, message = "text must be 1-500 characters"))]
    pub text: String,

    #[validate(length(min = 1, message = "source is required"))]
    pub source: String,

    /// Epoch seconds; the gateway stamps submission time when absent
    pub timestamp: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CreateFeedbackResponse {
    pub feedback_id: Uuid,
    pub accepted: bool,
}

/// Analyzed feedback as returned to HTTP clients.
#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub feedback_id: String,
    pub source: String,
    pub text: String,
    pub keywords: Vec<String>,
    pub sentiment: String,
    pub timestamp: DateTime<Utc>,
}

impl TryFrom<Feedback> for FeedbackResponse {
    type Error = GatewayError;

    fn try_from(feedback: Feedback) -> Result<Self, Self::Error> {
        let ts = feedback
            .timestamp
            .ok_or_else(|| GatewayError::Validation("feedback timestamp missing".to_string()))?;

        if !(0..1_000_000_000).contains(&ts.nanos) {
            return Err(GatewayError::Validation(format!(
                "feedback timestamp nanos {} out of range",
                ts.nanos
            )));
        }

        let timestamp = DateTime::from_timestamp(ts.seconds, ts.nanos as u32).ok_or_else(|| {
            GatewayError::Validation(format!("feedback timestamp {} out of range", ts.seconds))
        })?;

        Ok(Self {
            feedback_id: feedback.feedback_id,
            source: feedback.source,
            text: feedback.text,
            keywords: feedback.keywords,
            sentiment: feedback.sentiment,
            timestamp,
        })
    }
}
