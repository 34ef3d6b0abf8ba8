//! Error types for state consumers

use thiserror::Error;

/// Consumer errors; the hub logs them and keeps going
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{service} returned HTTP {status}: {message}")]
    Http {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("{service} error {code}: {message}")]
    Service {
        service: &'static str,
        code: i64,
        message: String,
    },

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("Storage error: {0}")]
    Storage(#[from] aurora_storage::StorageError),

    /// A desktop integration surface rejected an update
    #[error("{0}")]
    Surface(String),
}

impl From<SyncError> for aurora_core::AuroraError {
    fn from(err: SyncError) -> Self {
        Self::network(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
