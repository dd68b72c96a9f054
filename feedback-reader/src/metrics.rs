//! Reader service metrics.
//!
//! Counters are registered against the registry handed in at construction
//! and the struct is shared by `Arc`, so tests can build an isolated
//! registry and assert on values instead of scraping process-wide state.

use actix_web::{web, HttpResponse};
use prometheus::{Encoder, IntCounter, Opts, Registry, TextEncoder};

pub struct ReaderMetrics {
    pub consumed_messages: IntCounter,
    pub poison_messages: IntCounter,
    pub retry_exhausted_messages: IntCounter,
    pub stored_feedback: IntCounter,
    pub cache_hits: IntCounter,
    pub cache_misses: IntCounter,
    pub success_grpc_requests: IntCounter,
    pub error_grpc_requests: IntCounter,
}

impl ReaderMetrics {
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let consumed_messages = IntCounter::with_opts(Opts::new(
            "feedback_reader_consumed_messages_total",
            "Kafka messages fetched by the consumer pool",
        ))?;
        let poison_messages = IntCounter::with_opts(Opts::new(
            "feedback_reader_poison_messages_total",
            "Messages skipped because they could not be decoded or validated",
        ))?;
        let retry_exhausted_messages = IntCounter::with_opts(Opts::new(
            "feedback_reader_retry_exhausted_messages_total",
            "Messages dropped after the store-write retry budget was spent",
        ))?;
        let stored_feedback = IntCounter::with_opts(Opts::new(
            "feedback_reader_stored_feedback_total",
            "Analyzed feedback records written to the durable store",
        ))?;
        let cache_hits = IntCounter::with_opts(Opts::new(
            "feedback_reader_cache_hits_total",
            "Reads served from the cache",
        ))?;
        let cache_misses = IntCounter::with_opts(Opts::new(
            "feedback_reader_cache_misses_total",
            "Reads that fell through to the durable store",
        ))?;
        let success_grpc_requests = IntCounter::with_opts(Opts::new(
            "feedback_reader_success_grpc_requests_total",
            "gRPC requests answered successfully",
        ))?;
        let error_grpc_requests = IntCounter::with_opts(Opts::new(
            "feedback_reader_error_grpc_requests_total",
            "gRPC requests answered with an error status",
        ))?;

        registry.register(Box::new(consumed_messages.clone()))?;
        registry.register(Box::new(poison_messages.clone()))?;
        registry.register(Box::new(retry_exhausted_messages.clone()))?;
        registry.register(Box::new(stored_feedback.clone()))?;
        registry.register(Box::new(cache_hits.clone()))?;
        registry.register(Box::new(cache_misses.clone()))?;
        registry.register(Box::new(success_grpc_requests.clone()))?;
        registry.register(Box::new(error_grpc_requests.clone()))?;

        Ok(Self {
            consumed_messages,
            poison_messages,
            retry_exhausted_messages,
            stored_feedback,
            cache_hits,
            cache_misses,
            success_grpc_requests,
            error_grpc_requests,
        })
    }
}

pub async fn serve_metrics(registry: web::Data<Registry>) -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_register_once_per_registry() {
        let registry = Registry::new();
        let metrics = ReaderMetrics::new(&registry).unwrap();

        metrics.consumed_messages.inc();
        metrics.poison_messages.inc();

        let families = registry.gather();
        assert!(families
            .iter()
            .any(|f| f.get_name() == "feedback_reader_consumed_messages_total"));

        // Registering the same counters twice on one registry is a caller bug.
        assert!(ReaderMetrics::new(&registry).is_err());
    }
}
