/// Range-request media route
use crate::{
    error::{HostError, Result},
    services::media_server,
};
use axum::{
    http::{header, HeaderMap, Uri},
    response::Response,
};

pub const MEDIA_PREFIX: &str = "/media";

/// GET /media/*path
///
/// The rest of the URI path is the percent-encoded absolute file path, as
/// produced by [`media_server::encode_path`]. It is decoded from the raw URI
/// so escaped `%`, `#` and `?` survive intact.
pub async fn stream_media(uri: Uri, headers: HeaderMap) -> Result<Response> {
    let encoded = uri.path().strip_prefix(MEDIA_PREFIX).unwrap_or_default();
    let path = media_server::decode_path(encoded)
        .ok_or_else(|| HostError::NotFound("Empty media path".to_string()))?;

    let range = headers
        .get(header::RANGE)
        .and_then(|value| value.to_str().ok());

    tracing::debug!(path = %path.display(), ?range, "Media request");
    media_server::serve_file(&path, range).await
}
