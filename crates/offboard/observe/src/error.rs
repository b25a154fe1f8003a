//! Error type for sink implementations

/// Errors raised by audit and notification sinks
#[derive(Debug, thiserror::Error)]
pub enum ObserveError {
    #[error("sink io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("sink serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("sink rejected the record: {0}")]
    Rejected(String),
}

/// Result type alias for sink operations
pub type ObserveResult<T> = Result<T, ObserveError>;
