//! Error types for sink client operations

use thiserror::Error;

/// Result type alias for sink client operations
pub type Result<T> = std::result::Result<T, SinkError>;

/// Errors that can occur while talking to the state-store
#[derive(Error, Debug)]
pub enum SinkError {
    /// HTTP request failed (includes timeouts and connection errors)
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// The state-store answered with a non-success status
    #[error("Sink error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// A header or request could not be constructed
    #[error("Failed to build request: {0}")]
    ParseError(String),
}

impl SinkError {
    /// Create a server error from status code and message
    pub fn server_error(status: u16, message: impl Into<String>) -> Self {
        Self::ServerError {
            status,
            message: message.into(),
        }
    }
}
