//! Feedback gateway service.
//!
//! HTTP front door for the pipeline: validates submissions, assigns their
//! identity, publishes them to Kafka, and proxies reads to the
//! feedback-reader over gRPC.

pub mod config;
pub mod dto;
pub mod error;
pub mod grpc_client;
pub mod kafka;
pub mod metrics;
pub mod routes;
