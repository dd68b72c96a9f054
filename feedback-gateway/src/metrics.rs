//! Gateway metrics, registered per-instance so tests can assert on values.

use actix_web::{web, HttpResponse};
use prometheus::{Encoder, IntCounter, Opts, Registry, TextEncoder};

pub struct ApiMetrics {
    pub post_feedback_requests: IntCounter,
    pub get_feedback_requests: IntCounter,
    pub success_http_requests: IntCounter,
    pub error_http_requests: IntCounter,
    pub published_events: IntCounter,
    pub publish_errors: IntCounter,
}

impl ApiMetrics {
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let post_feedback_requests = IntCounter::with_opts(Opts::new(
            "feedback_gateway_post_feedback_requests_total",
            "Feedback submission requests received",
        ))?;
        let get_feedback_requests = IntCounter::with_opts(Opts::new(
            "feedback_gateway_get_feedback_requests_total",
            "Feedback read requests received",
        ))?;
        let success_http_requests = IntCounter::with_opts(Opts::new(
            "feedback_gateway_success_http_requests_total",
            "HTTP requests answered successfully",
        ))?;
        let error_http_requests = IntCounter::with_opts(Opts::new(
            "feedback_gateway_error_http_requests_total",
            "HTTP requests answered with an error",
        ))?;
        let published_events = IntCounter::with_opts(Opts::new(
            "feedback_gateway_published_events_total",
            "Events durably enqueued on the raw-feedback topic",
        ))?;
        let publish_errors = IntCounter::with_opts(Opts::new(
            "feedback_gateway_publish_errors_total",
            "Publish attempts that failed",
        ))?;

        registry.register(Box::new(post_feedback_requests.clone()))?;
        registry.register(Box::new(get_feedback_requests.clone()))?;
        registry.register(Box::new(success_http_requests.clone()))?;
        registry.register(Box::new(error_http_requests.clone()))?;
        registry.register(Box::new(published_events.clone()))?;
        registry.register(Box::new(publish_errors.clone()))?;

        Ok(Self {
            post_feedback_requests,
            get_feedback_requests,
            success_http_requests,
            error_http_requests,
            published_events,
            publish_errors,
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
