//! HTTP handlers for the feedback API.
//!
//! POST /api/v1/feedbacks      - Submit feedback for analysis
//! GET  /api/v1/feedbacks/{id} - Get analyzed feedback by ID

use actix_web::{web, HttpResponse};
use chrono::Utc;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;
use validator::Validate;

use event_schema::FeedbackSubmittedEvent;

use crate::dto::{CreateFeedbackRequest, CreateFeedbackResponse, FeedbackResponse};
use crate::error::{GatewayError, Result};
use crate::grpc_client::ReaderClient;
use crate::kafka::FeedbackEventProducer;
use crate::metrics::ApiMetrics;

pub struct AppState {
    pub producer: Arc<FeedbackEventProducer>,
    pub reader: ReaderClient,
    pub metrics: Arc<ApiMetrics>,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/feedbacks")
            .route("", web::post().to(create_feedback))
            .route("/{id}", web::get().to(get_feedback_by_id)),
    );
}

/// The identity is assigned here, exactly once, before the event is
/// published; nothing downstream regenerates it.
fn build_submitted_event(request: CreateFeedbackRequest, now: i64) -> FeedbackSubmittedEvent {
    FeedbackSubmittedEvent {
        feedback_id: Uuid::new_v4(),
        source: request.source,
        text: request.text,
        timestamp: request.timestamp.unwrap_or(now),
    }
}

pub async fn create_feedback(
    state: web::Data<AppState>,
    body: web::Json<CreateFeedbackRequest>,
) -> Result<HttpResponse> {
    state.metrics.post_feedback_requests.inc();

    let request = body.into_inner();
    if let Err(e) = request.validate() {
        warn!("feedback submission rejected: {}", e);
        state.metrics.error_http_requests.inc();
        return Err(e.into());
    }

    let event = build_submitted_event(request, Utc::now().timestamp());
    let correlation_id = Uuid::new_v4().to_string();

    match state
        .producer
        .publish_submitted(&event, &correlation_id)
        .await
    {
        Ok(()) => {
            state.metrics.published_events.inc();
            state.metrics.success_http_requests.inc();
            Ok(HttpResponse::Created().json(CreateFeedbackResponse {
                feedback_id: event.feedback_id,
                accepted: true,
            }))
        }
        Err(e) => {
            state.metrics.publish_errors.inc();
            state.metrics.error_http_requests.inc();
            Err(e)
        }
    }
}

pub async fn get_feedback_by_id(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    state.metrics.get_feedback_requests.inc();

    let feedback_id = path.into_inner().parse::<Uuid>().map_err(|_| {
        state.metrics.error_http_requests.inc();
        GatewayError::Validation("feedback id must be a UUID".to_string())
    })?;

    match state.reader.get_feedback_by_id(feedback_id).await {
        Ok(feedback) => {
            let response = FeedbackResponse::try_from(feedback).map_err(|e| {
                state.metrics.error_http_requests.inc();
                e
            })?;
            state.metrics.success_http_requests.inc();
            Ok(HttpResponse::Ok().json(response))
        }
        Err(e) => {
            warn!(feedback_id = %feedback_id, "GetFeedbackById failed: {}", e);
            state.metrics.error_http_requests.inc();
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_gets_a_fresh_identity_per_submission() {
        let request = CreateFeedbackRequest {
            text: "Great support".to_string(),
            source: "email".to_string(),
            timestamp: Some(1678901234),
        };

        let first = build_submitted_event(request.clone(), 0);
        let second = build_submitted_event(request, 0);

        assert_ne!(first.feedback_id, second.feedback_id);
        assert_eq!(first.timestamp, 1678901234);
    }

    #[test]
    fn test_missing_timestamp_defaults_to_submission_time() {
        let request = CreateFeedbackRequest {
            text: "Great support".to_string(),
            source: "email".to_string(),
            timestamp: None,
        };

        let event = build_submitted_event(request, 1700000000);
        assert_eq!(event.timestamp, 1700000000);
    }
}
