//! Error types for playback management

use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Queue is empty
    #[error("Queue is empty")]
    QueueEmpty,

    /// Index out of bounds
    #[error("Index out of bounds: {index} (queue length {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    /// The track could not be turned into a pipeline source
    #[error("Cannot resolve source for {path}: {reason}")]
    Unresolvable { path: String, reason: String },
}

impl From<PlaybackError> for aurora_core::AuroraError {
    fn from(err: PlaybackError) -> Self {
        match err {
            PlaybackError::IndexOutOfBounds { .. } => Self::invalid_input(err.to_string()),
            other => Self::playback(other.to_string()),
        }
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
