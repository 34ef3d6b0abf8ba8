/// Host error types
use aurora_core::AuroraError;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HostError>;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Range start lies past the end of a file of `size` bytes
    #[error("Range not satisfiable for {size} byte file")]
    RangeNotSatisfiable { size: u64 },

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] AuroraError),
}

macro_rules! via_core {
    ($($err:ty),* $(,)?) => {
        $(
            impl From<$err> for HostError {
                fn from(err: $err) -> Self {
                    HostError::Core(err.into())
                }
            }
        )*
    };
}

via_core!(
    aurora_library::LibraryError,
    aurora_metadata::MetadataError,
    aurora_storage::StorageError,
    aurora_subsonic::SubsonicError,
    aurora_playback::PlaybackError,
    aurora_enrichment::EnrichmentError,
    aurora_sync::SyncError,
);

impl IntoResponse for HostError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            HostError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            HostError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            HostError::RangeNotSatisfiable { size } => {
                return (
                    StatusCode::RANGE_NOT_SATISFIABLE,
                    [(header::CONTENT_RANGE, format!("bytes */{size}"))],
                    "Range Not Satisfiable",
                )
                    .into_response();
            }
            HostError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            HostError::Core(AuroraError::NotFound { entity, id }) => {
                (StatusCode::NOT_FOUND, format!("{entity} not found: {id}"))
            }
            HostError::Core(AuroraError::InvalidInput(msg)) => (StatusCode::BAD_REQUEST, msg),
            HostError::Core(AuroraError::Network(ref msg)) => {
                tracing::warn!("Upstream error: {}", msg);
                (StatusCode::BAD_GATEWAY, msg.clone())
            }
            HostError::Core(ref e) => {
                tracing::error!("Core error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            HostError::Config(ref msg) => {
                tracing::error!("Config error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Configuration error".to_string(),
                )
            }
            HostError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            HostError::Io(ref e) => {
                tracing::error!("IO error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "IO error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
