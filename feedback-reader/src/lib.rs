//! Feedback reader service.
//!
//! Consumes analyzed feedback from Kafka into Postgres with a Redis
//! projection, and serves it back over gRPC with a cache-aside read path.

pub mod config;
pub mod consumer;
pub mod error;
pub mod grpc;
pub mod metrics;
pub mod models;
pub mod queries;
pub mod repository;
