//! Error types for the Subsonic client.

use thiserror::Error;

/// Errors that can occur when talking to a Subsonic-compatible server.
#[derive(Error, Debug)]
pub enum SubsonicError {
    /// No server has been configured yet
    #[error("Subsonic server not configured")]
    NotConfigured,

    /// Invalid server URL
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server answered with a non-success HTTP status
    #[error("Server error ({status}): {message}")]
    Http { status: u16, message: String },

    /// Server answered `status: failed`
    #[error("Subsonic error {code}: {message}")]
    Api { code: i64, message: String },

    /// Failed to parse server response
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl From<SubsonicError> for aurora_core::AuroraError {
    fn from(err: SubsonicError) -> Self {
        Self::network(err.to_string())
    }
}

/// Result type for Subsonic operations.
pub type Result<T> = std::result::Result<T, SubsonicError>;
