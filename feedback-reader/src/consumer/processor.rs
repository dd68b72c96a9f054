use std::sync::Arc;
use tracing::{error, warn};
use validator::Validate;

use event_schema::FeedbackAnalyzedEvent;
use resilience::{with_retry, RetryConfig};

use crate::metrics::ReaderMetrics;
use crate::models::AnalyzedFeedback;
use crate::repository::{FeedbackCache, FeedbackRepository};

/// How a message was resolved. Every variant ends in a commit; the worker
/// loop never leaves an offset behind while continuing to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Written to the store (cache populate attempted best-effort)
    Stored,
    /// Undecodable or structurally invalid payload, skipped without retry
    Poison,
    /// Store kept failing until the retry budget ran out, dropped with signal
    RetriesExhausted,
}

/// Per-message processing pipeline for the analyzed-feedback topic.
///
/// Deserialize, validate, then upsert under a bounded retry; populate the
/// cache only after the store write succeeds. The processor is deliberately
/// free of Kafka types so tests can drive it with raw payloads.
pub struct AnalyzedFeedbackProcessor {
    store: Arc<dyn FeedbackRepository>,
    cache: Arc<dyn FeedbackCache>,
    retry: RetryConfig,
    metrics: Arc<ReaderMetrics>,
}

impl AnalyzedFeedbackProcessor {
    pub fn new(
        store: Arc<dyn FeedbackRepository>,
        cache: Arc<dyn FeedbackCache>,
        retry: RetryConfig,
        metrics: Arc<ReaderMetrics>,
    ) -> Self {
        Self {
            store,
            cache,
            retry,
            metrics,
        }
    }

    pub async fn handle_payload(&self, payload: Option<&[u8]>) -> ProcessOutcome {
        let Some(payload) = payload else {
            warn!("message has no payload, skipping");
            self.metrics.poison_messages.inc();
            return ProcessOutcome::Poison;
        };

        let event: FeedbackAnalyzedEvent = match serde_json::from_slice(payload) {
            Ok(event) => event,
            Err(e) => {
                warn!("failed to deserialize analyzed feedback: {}", e);
                self.metrics.poison_messages.inc();
                return ProcessOutcome::Poison;
            }
        };

        let feedback = match AnalyzedFeedback::try_from(event) {
            Ok(feedback) => feedback,
            Err(e) => {
                warn!("analyzed feedback rejected: {}", e);
                self.metrics.poison_messages.inc();
                return ProcessOutcome::Poison;
            }
        };

        // Malformed business data cannot be fixed by retrying.
        if let Err(e) = feedback.validate() {
            warn!(feedback_id = %feedback.feedback_id, "analyzed feedback rejected: {}", e);
            self.metrics.poison_messages.inc();
            return ProcessOutcome::Poison;
        }

        let write = with_retry(&self.retry, || async {
            self.store.upsert(&feedback).await
        })
        .await;

        match write {
            Ok(()) => {
                self.metrics.stored_feedback.inc();

                // Best-effort: a cold cache only costs the next read a store
                // round-trip.
                if let Err(e) = self.cache.put(&feedback).await {
                    warn!(feedback_id = %feedback.feedback_id, "cache populate failed: {}", e);
                }

                ProcessOutcome::Stored
            }
            Err(e) => {
                error!(
                    feedback_id = %feedback.feedback_id,
                    "dropping message, store write failed: {}", e
                );
                self.metrics.retry_exhausted_messages.inc();
                ProcessOutcome::RetriesExhausted
            }
        }
    }
}
