//! Error types shared across the pipeline

use thiserror::Error;

/// Pipeline-wide error type
#[derive(Error, Debug)]
pub enum PulseError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Analysis error: {0}")]
    Analysis(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PulseError {
    pub fn api(msg: impl Into<String>) -> Self {
        PulseError::Api(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        PulseError::Network(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        PulseError::Parse(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        PulseError::NotFound(msg.into())
    }

    pub fn analysis(msg: impl Into<String>) -> Self {
        PulseError::Analysis(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        PulseError::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        PulseError::Internal(msg.into())
    }
}

/// Result type alias for pipeline operations
pub type PulseResult<T> = Result<T, PulseError>;
