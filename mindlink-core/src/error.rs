//! Core error types for Mindlink.

use thiserror::Error;

/// Error type for Mindlink operations.
#[derive(Debug, Error)]
pub enum MindError {
    /// Authentication failed (bad credentials). Fatal; propagates from
    /// client construction.
    #[error("Authentication failed: {0}")]
    AuthFailure(String),

    /// The refresh token itself is no longer usable. A new password grant
    /// is required.
    #[error("Refresh token expired or unavailable")]
    AuthExpired,

    /// The access token has expired. Recoverable: read and write paths
    /// re-authenticate once and retry before surfacing this.
    #[error("Access token expired")]
    TokenExpired,

    /// The server negotiated a token type this client cannot inject.
    #[error("Unsupported token type: {0}")]
    UnsupportedTokenType(String),

    /// Invalid token placement mode. Configuration error; fails fast.
    #[error("Invalid token placement: {0}")]
    InvalidPlacement(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Non-2xx HTTP response on a path that propagates (POST).
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body or status text.
        message: String,
    },

    /// Transport-level failure (connect, TLS, timeout).
    #[error("Transport error: {0}")]
    Transport(String),

    /// Serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Token cache file IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MindError {
    /// Returns true if this error is the recoverable token-expiry signal.
    pub fn is_token_expired(&self) -> bool {
        matches!(self, Self::TokenExpired)
    }
}
