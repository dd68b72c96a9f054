//! Kafka producer for feedback submissions.
//!
//! Publish is fire-and-forget from the caller's perspective: success means
//! the event is durably enqueued on the bus, nothing more. There is no local
//! retry; a failed publish fails the originating request.

use rdkafka::message::OwnedHeaders;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::ClientConfig;
use std::time::Duration;
use tracing::{error, info};

use event_schema::{inject_correlation_id, topics, FeedbackSubmittedEvent};

use crate::error::{GatewayError, Result};

pub struct FeedbackEventProducer {
    producer: FutureProducer,
    delivery_timeout: Duration,
}

impl FeedbackEventProducer {
    pub fn new(brokers: &str) -> std::result::Result<Self, rdkafka::error::KafkaError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("enable.idempotence", "true")
            .set("acks", "all")
            .set("max.in.flight.requests.per.connection", "5")
            .set("retries", "3")
            .set("compression.type", "lz4")
            .set("linger.ms", "10")
            .set("message.timeout.ms", "30000")
            .create()?;

        info!("Feedback producer initialized with brokers: {}", brokers);

        Ok(Self {
            producer,
            delivery_timeout: Duration::from_secs(30),
        })
    }

    /// Publish a submitted-feedback event to the raw topic, carrying the
    /// correlation id as a message header.
    pub async fn publish_submitted(
        &self,
        event: &FeedbackSubmittedEvent,
        correlation_id: &str,
    ) -> Result<()> {
        let payload = serde_json::to_string(event)
            .map_err(|e| GatewayError::Internal(format!("event serialization failed: {e}")))?;

        let key = event.feedback_id.to_string();
        let headers = inject_correlation_id(OwnedHeaders::new(), correlation_id);

        let record = FutureRecord::to(topics::RAW_FEEDBACK)
            .key(&key)
            .payload(&payload)
            .headers(headers);

        match self.producer.send(record, self.delivery_timeout).await {
            Ok((partition, offset)) => {
                info!(
                    feedback_id = %event.feedback_id,
                    partition = partition,
                    offset = offset,
                    "Published feedback submission"
                );
                Ok(())
            }
            Err((err, _)) => {
                error!(
                    feedback_id = %event.feedback_id,
                    error = %err,
                    "Failed to publish feedback submission"
                );
                Err(GatewayError::Kafka(err.to_string()))
            }
        }
    }
}
