use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReaderError>;

#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Kafka error: {0}")]
    Kafka(String),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

impl From<sqlx::Error> for ReaderError {
    fn from(err: sqlx::Error) -> Self {
        ReaderError::Database(err.to_string())
    }
}
