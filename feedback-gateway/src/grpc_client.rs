//! gRPC client for the feedback-reader service.

use tonic::transport::Channel;
use uuid::Uuid;

use crate::error::{GatewayError, Result};

pub mod proto {
    pub mod feedback {
        pub mod reader {
            pub mod v1 {
                tonic::include_proto!("feedback.reader.v1");
            }
        }
    }
}

use proto::feedback::reader::v1::feedback_reader_client::FeedbackReaderClient;
pub use proto::feedback::reader::v1::Feedback;
use proto::feedback::reader::v1::GetFeedbackByIdRequest;

/// Thin wrapper over the generated client. Cloning the tonic client is
/// cheap; each call clones so handlers can share one instance immutably.
#[derive(Clone)]
pub struct ReaderClient {
    inner: FeedbackReaderClient<Channel>,
}

impl ReaderClient {
    pub async fn connect(url: String) -> std::result::Result<Self, tonic::transport::Error> {
        let inner = FeedbackReaderClient::connect(url).await?;
        Ok(Self { inner })
    }

    pub async fn get_feedback_by_id(&self, feedback_id: Uuid) -> Result<Feedback> {
        let mut client = self.inner.clone();

        let response = client
            .get_feedback_by_id(GetFeedbackByIdRequest {
                feedback_id: feedback_id.to_string(),
            })
            .await?;

        response
            .into_inner()
            .feedback
            .ok_or_else(|| GatewayError::Reader("reader returned an empty response".to_string()))
    }
}
