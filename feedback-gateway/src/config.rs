/// Configuration for the feedback gateway, loaded from environment
/// variables with development defaults.
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Kafka producer configuration
    pub kafka: KafkaConfig,
    /// Reader service (gRPC) configuration
    pub reader: ReaderConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

/// Kafka producer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KafkaConfig {
    /// Kafka brokers (comma-separated)
    pub brokers: String,
}

/// Reader service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// gRPC endpoint of the feedback-reader service
    pub grpc_url: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Config {
            app: AppConfig {
                host: std::env::var("GATEWAY_SERVICE_HOST")
                    .unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("GATEWAY_SERVICE_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8080),
            },
            kafka: KafkaConfig {
                brokers: std::env::var("KAFKA_BROKERS")
                    .unwrap_or_else(|_| "localhost:9092".to_string()),
            },
            reader: ReaderConfig {
                grpc_url: std::env::var("READER_SERVICE_GRPC_URL")
                    .unwrap_or_else(|_| "http://localhost:9085".to_string()),
            },
        }
    }
}
