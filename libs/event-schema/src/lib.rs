//! Event schemas for the feedback pipeline Kafka topics.
//!
//! Both services depend on this crate so the producer and consumer agree on
//! topic names and payload shape. Payloads are JSON; the identity travels as
//! a UUID string and timestamps as epoch seconds.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod headers;

pub use headers::{extract_correlation_id, inject_correlation_id, CORRELATION_ID_HEADER};

/// Kafka topic names
pub mod topics {
    /// Raw submissions published by the gateway, consumed by the analyzer.
    pub const RAW_FEEDBACK: &str = "raw-feedback";
    /// Enriched feedback published by the analyzer, consumed by the reader.
    pub const ANALYZED_FEEDBACK: &str = "analyzed-feedback";
}

/// A feedback submission accepted by the gateway.
///
/// The gateway assigns `feedback_id` exactly once, before publish; nothing
/// downstream may regenerate it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackSubmittedEvent {
    pub feedback_id: Uuid,
    pub source: String,
    pub text: String,
    /// Epoch seconds, gateway-assigned when the client omits it
    pub timestamp: i64,
}

/// Enriched feedback emitted by the external analysis stage.
///
/// Carries the full submitted payload plus the enrichment fields, so the
/// reader can persist it without a join against the raw topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackAnalyzedEvent {
    pub feedback_id: Uuid,
    pub source: String,
    pub text: String,
    pub keywords: Vec<String>,
    pub sentiment: String,
    pub timestamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submitted_event_round_trip() {
        let event = FeedbackSubmittedEvent {
            feedback_id: Uuid::new_v4(),
            source: "email".to_string(),
            text: "Great support".to_string(),
            timestamp: 1678901234,
        };

        let json = serde_json::to_string(&event).unwrap();
        let decoded: FeedbackSubmittedEvent = serde_json::from_str(&json).unwrap();

        assert_eq!(decoded.feedback_id, event.feedback_id);
        assert_eq!(decoded.source, "email");
        assert_eq!(decoded.text, "Great support");
        assert_eq!(decoded.timestamp, 1678901234);
    }

    #[test]
    fn test_analyzed_event_field_names() {
        let json = r#"{
            "feedback_id": "6f4f8c1a-4f7e-4c3e-9e54-2e7a3de76a10",
            "source": "email",
            "text": "Great support",
            "keywords": ["support"],
            "sentiment": "positive",
            "timestamp": 1678901234
        }"#;

        let event: FeedbackAnalyzedEvent = serde_json::from_str(json).unwrap();

        assert_eq!(
            event.feedback_id.to_string(),
            "6f4f8c1a-4f7e-4c3e-9e54-2e7a3de76a10"
        );
        assert_eq!(event.keywords, vec!["support".to_string()]);
        assert_eq!(event.sentiment, "positive");
    }

    #[test]
    fn test_malformed_identity_is_rejected() {
        let json = r#"{
            "feedback_id": "not-a-uuid",
            "source": "email",
            "text": "Great support",
            "keywords": ["support"],
            "sentiment": "positive",
            "timestamp": 1678901234
        }"#;

        assert!(serde_json::from_str::<FeedbackAnalyzedEvent>(json).is_err());
    }
}
