//! Error types for the news provider client

use thiserror::Error;

/// Errors that can occur while talking to the news provider
#[derive(Debug, Error)]
pub enum NewsError {
    /// HTTP request failed before a response was received
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Provider returned an error response
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the provider
        message: String,
    },

    /// Failed to parse the provider response
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Provider signalled too many requests
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
