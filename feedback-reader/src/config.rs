/// Configuration for the feedback reader service, loaded from environment
/// variables with development defaults.
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Cache (Redis) configuration
    pub cache: CacheConfig,
    /// Kafka consumer configuration
    pub kafka: KafkaConfig,
    /// Retry policy for durable-store writes
    pub retry: RetryConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server host to bind to
    pub host: String,
    /// HTTP port (health, metrics)
    pub port: u16,
    /// gRPC port for the read path
    pub grpc_port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    pub max_connections: u32,
}

/// Cache (Redis) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Redis URL
    pub url: String,
    /// Prefix for analyzed-feedback cache keys
    pub key_prefix: String,
}

/// Kafka consumer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KafkaConfig {
    /// Kafka brokers (comma-separated)
    pub brokers: String,
    /// Consumer group ID
    pub group_id: String,
    /// Number of consumer workers sharing the group
    pub pool_size: usize,
}

/// Retry policy applied to the durable-store write
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per message, including the first
    pub max_attempts: u32,
    /// Base delay between attempts, milliseconds
    pub base_delay_ms: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Config {
            app: AppConfig {
                host: std::env::var("READER_SERVICE_HOST")
                    .unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("READER_SERVICE_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8085),
                grpc_port: std::env::var("READER_SERVICE_GRPC_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(9085),
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost/feedback".to_string()),
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|c| c.parse().ok())
                    .unwrap_or(10),
            },
            cache: CacheConfig {
                url: std::env::var("REDIS_URL")
                    .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
                key_prefix: std::env::var("REDIS_FEEDBACK_KEY_PREFIX")
                    .unwrap_or_else(|_| "feedback:analyzed".to_string()),
            },
            kafka: KafkaConfig {
                brokers: std::env::var("KAFKA_BROKERS")
                    .unwrap_or_else(|_| "localhost:9092".to_string()),
                group_id: std::env::var("KAFKA_GROUP_ID")
                    .unwrap_or_else(|_| "feedback-reader".to_string()),
                pool_size: std::env::var("KAFKA_CONSUMER_POOL_SIZE")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30),
            },
            retry: RetryConfig {
                max_attempts: std::env::var("STORE_RETRY_ATTEMPTS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(3),
                base_delay_ms: std::env::var("STORE_RETRY_DELAY_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(300),
            },
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> resilience::RetryConfig {
        resilience::RetryConfig {
            max_attempts: self.max_attempts,
            base_delay: std::time::Duration::from_millis(self.base_delay_ms),
        }
    }
}
