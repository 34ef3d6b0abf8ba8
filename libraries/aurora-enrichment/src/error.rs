//! Error types for enrichment lookups

use thiserror::Error;

/// Enrichment errors
///
/// Callers of the public lookups never see these; every lookup degrades to
/// `None`. They drive the retry decision inside the fetcher.
#[derive(Error, Debug)]
pub enum EnrichmentError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Service error ({status}): {message}")]
    Http { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EnrichmentError {
    /// Whether a retry could succeed: 5xx, timeouts and connect failures
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Request(e) => e.is_timeout() || e.is_connect(),
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<EnrichmentError> for aurora_core::AuroraError {
    fn from(err: EnrichmentError) -> Self {
        Self::network(err.to_string())
    }
}

/// Result type for enrichment operations
pub type Result<T> = std::result::Result<T, EnrichmentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_server_errors_are_transient() {
        let server = EnrichmentError::Http {
            status: 503,
            message: String::new(),
        };
        let client = EnrichmentError::Http {
            status: 429,
            message: String::new(),
        };
        assert!(server.is_transient());
        assert!(!client.is_transient());
        assert!(!EnrichmentError::Parse("bad".into()).is_transient());
    }
}
