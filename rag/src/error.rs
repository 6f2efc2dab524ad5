use thiserror::Error;

/// Errors that can occur during pipeline operations.
#[derive(Error, Debug)]
pub enum RagError {
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("embedding provider error: {0}")]
    Embedding(String),

    #[error("vector index error: {0}")]
    Index(String),

    #[error("completion provider error: {0}")]
    Completion(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("rate limit exceeded for session {0}")]
    RateLimited(String),
}
