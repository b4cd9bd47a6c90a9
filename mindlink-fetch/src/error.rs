//! Transport error types.

use mindlink_core::MindError;
use thiserror::Error;

/// Error type for transport operations.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Request failed at the HTTP level (connect, TLS, body read).
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Build(String),
}

impl From<TransportError> for MindError {
    fn from(err: TransportError) -> Self {
        MindError::Transport(err.to_string())
    }
}
