// gRPC server implementation for FeedbackReader
use std::sync::Arc;
use tonic::{Request, Response, Status};
use tracing::warn;
use uuid::Uuid;

use crate::error::ReaderError;
use crate::metrics::ReaderMetrics;
use crate::models::AnalyzedFeedback;
use crate::queries::GetFeedbackByIdHandler;

pub mod feedback {
    pub mod reader {
        pub mod v1 {
            tonic::include_proto!("feedback.reader.v1");
        }
    }
}

use feedback::reader::v1::feedback_reader_server::FeedbackReader;
pub use feedback::reader::v1::feedback_reader_server::FeedbackReaderServer;
use feedback::reader::v1::{Feedback, GetFeedbackByIdRequest, GetFeedbackByIdResponse};

pub struct FeedbackReaderService {
    queries: Arc<GetFeedbackByIdHandler>,
    metrics: Arc<ReaderMetrics>,
}

impl FeedbackReaderService {
    pub fn new(queries: Arc<GetFeedbackByIdHandler>, metrics: Arc<ReaderMetrics>) -> Self {
        Self { queries, metrics }
    }

    fn parse_uuid(uuid_str: &str, field_name: &str) -> Result<Uuid, Status> {
        uuid_str
            .parse::<Uuid>()
            .map_err(|_| Status::invalid_argument(format!("Invalid {}: {}", field_name, uuid_str)))
    }

    fn error_to_status(err: ReaderError) -> Status {
        match err {
            ReaderError::NotFound(id) => Status::not_found(format!("feedback {} not found", id)),
            ReaderError::Validation(msg) => Status::invalid_argument(msg),
            other => Status::internal(other.to_string()),
        }
    }
}

/// Field-for-field mapping into the wire representation. Identity is
/// stringified; the timestamp is always representable in proto form.
pub fn feedback_to_proto(feedback: AnalyzedFeedback) -> Feedback {
    Feedback {
        feedback_id: feedback.feedback_id.to_string(),
        source: feedback.source,
        text: feedback.text,
        keywords: feedback.keywords,
        sentiment: feedback.sentiment,
        timestamp: Some(prost_types::Timestamp {
            seconds: feedback.feedback_timestamp.timestamp(),
            nanos: feedback.feedback_timestamp.timestamp_subsec_nanos() as i32,
        }),
    }
}

#[tonic::async_trait]
impl FeedbackReader for FeedbackReaderService {
    async fn get_feedback_by_id(
        &self,
        request: Request<GetFeedbackByIdRequest>,
    ) -> Result<Response<GetFeedbackByIdResponse>, Status> {
        let req = request.into_inner();

        let feedback_id = Self::parse_uuid(&req.feedback_id, "feedback_id").map_err(|s| {
            self.metrics.error_grpc_requests.inc();
            s
        })?;

        match self.queries.handle(feedback_id).await {
            Ok(feedback) => {
                self.metrics.success_grpc_requests.inc();
                Ok(Response::new(GetFeedbackByIdResponse {
                    feedback: Some(feedback_to_proto(feedback)),
                }))
            }
            Err(e) => {
                warn!(feedback_id = %feedback_id, "GetFeedbackById failed: {}", e);
                self.metrics.error_grpc_requests.inc();
                Err(Self::error_to_status(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_proto_mapping_is_field_for_field() {
        let feedback_id = Uuid::new_v4();
        let feedback = AnalyzedFeedback {
            feedback_id,
            source: "email".to_string(),
            text: "Great support".to_string(),
            keywords: vec!["support".to_string(), "praise".to_string()],
            sentiment: "positive".to_string(),
            feedback_timestamp: Utc.timestamp_opt(1678901234, 500_000_000).unwrap(),
        };

        let proto = feedback_to_proto(feedback);

        assert_eq!(proto.feedback_id, feedback_id.to_string());
        assert_eq!(proto.source, "email");
        assert_eq!(proto.text, "Great support");
        assert_eq!(proto.keywords, vec!["support", "praise"]);
        assert_eq!(proto.sentiment, "positive");
        let ts = proto.timestamp.unwrap();
        assert_eq!(ts.seconds, 1678901234);
        assert_eq!(ts.nanos, 500_000_000);
    }

    #[test]
    fn test_uuid_parse_rejects_malformed_identity() {
        assert!(FeedbackReaderService::parse_uuid("not-a-uuid", "feedback_id").is_err());
        assert!(
            FeedbackReaderService::parse_uuid(&Uuid::new_v4().to_string(), "feedback_id").is_ok()
        );
    }

    #[test]
    fn test_error_mapping() {
        let not_found = FeedbackReaderService::error_to_status(ReaderError::NotFound(
            "abc".to_string(),
        ));
        assert_eq!(not_found.code(), tonic::Code::NotFound);

        let validation = FeedbackReaderService::error_to_status(ReaderError::Validation(
            "bad".to_string(),
        ));
        assert_eq!(validation.code(), tonic::Code::InvalidArgument);

        let database = FeedbackReaderService::error_to_status(ReaderError::Database(
            "down".to_string(),
        ));
        assert_eq!(database.code(), tonic::Code::Internal);
    }
}
