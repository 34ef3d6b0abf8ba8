//! Range-request media serving
//!
//! Local files are addressed as `localfile://<percent-encoded absolute path>`
//! and served with HTTP range semantics so an audio element can seek without
//! loading the whole file. Bodies are streamed from disk; dropping the
//! response body closes the file.

use crate::error::{HostError, Result};
use axum::{
    body::Body,
    http::{header, StatusCode},
    response::Response,
};
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;
use url::Url;

pub const MEDIA_SCHEME: &str = "localfile";

/// Chunk size of the streamed body
const READ_CHUNK: usize = 64 * 1024;

/// Content type for a file extension; unknown extensions are octet streams
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "mp3" => "audio/mpeg",
        "flac" => "audio/flac",
        "ogg" => "audio/ogg",
        "opus" => "audio/opus",
        "wav" => "audio/wav",
        "m4a" | "alac" => "audio/mp4",
        "aac" => "audio/aac",
        "wma" => "audio/x-ms-wma",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}

/// Percent-encoded path component for an absolute file path
pub fn encode_path(path: &Path) -> Option<String> {
    Url::from_file_path(path).ok().map(|url| url.path().to_string())
}

/// `localfile://` URL for an absolute file path
pub fn media_url(path: &Path) -> Option<String> {
    encode_path(path).map(|encoded| format!("{MEDIA_SCHEME}://{encoded}"))
}

/// File path addressed by a `localfile://` URL
pub fn parse_media_url(raw: &str) -> Option<PathBuf> {
    let rest = raw.strip_prefix(MEDIA_SCHEME)?.strip_prefix("://")?;
    let rest = rest.split(['?', '#']).next().unwrap_or_default();
    decode_path(rest)
}

/// Decode a percent-encoded path; empty paths and `/` address nothing
pub fn decode_path(encoded: &str) -> Option<PathBuf> {
    if encoded.is_empty() || encoded == "/" {
        return None;
    }
    let rooted = if encoded.starts_with('/') {
        encoded.to_string()
    } else {
        format!("/{encoded}")
    };
    Url::parse(&format!("file://{rooted}"))
        .ok()?
        .to_file_path()
        .ok()
}

/// What a `Range` header asks for, against a file of known size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteRange {
    /// No usable range: send everything
    Full,
    /// Inclusive byte span
    Partial { start: u64, end: u64 },
    Unsatisfiable,
}

/// Interpret a `Range` header value
///
/// Only `bytes=start-[end]` is honored; `end` is clamped to the last byte.
/// Anything else (suffix ranges, multiple ranges, junk) falls back to the
/// full body.
pub fn parse_range(header: Option<&str>, size: u64) -> ByteRange {
    let Some(spec) = header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
        return ByteRange::Full;
    };
    let Some((start, end)) = spec.split_once('-') else {
        return ByteRange::Full;
    };
    let Ok(start) = start.trim().parse::<u64>() else {
        return ByteRange::Full;
    };
    let end = match end.trim() {
        "" => None,
        digits => match digits.parse::<u64>() {
            Ok(end) => Some(end),
            Err(_) => return ByteRange::Full,
        },
    };

    if start >= size {
        return ByteRange::Unsatisfiable;
    }
    let last = size - 1;
    let end = end.map_or(last, |e| e.min(last));
    if end < start {
        return ByteRange::Unsatisfiable;
    }
    ByteRange::Partial { start, end }
}

/// Serve `path` honoring an optional `Range` header value
pub async fn serve_file(path: &Path, range: Option<&str>) -> Result<Response> {
    let not_found = || HostError::NotFound(format!("No such file: {}", path.display()));

    let metadata = tokio::fs::metadata(path).await.map_err(|_| not_found())?;
    if !metadata.is_file() {
        return Err(not_found());
    }
    let size = metadata.len();
    let content_type = content_type_for(path);

    let mut file = File::open(path).await.map_err(|_| not_found())?;

    let response = match parse_range(range, size) {
        ByteRange::Unsatisfiable => {
            tracing::debug!(path = %path.display(), ?range, size, "Unsatisfiable range");
            return Err(HostError::RangeNotSatisfiable { size });
        }
        ByteRange::Partial { start, end } => {
            let length = end - start + 1;
            file.seek(SeekFrom::Start(start)).await?;
            let body = Body::from_stream(ReaderStream::with_capacity(file.take(length), READ_CHUNK));

            Response::builder()
                .status(StatusCode::PARTIAL_CONTENT)
                .header(header::CONTENT_TYPE, content_type)
                .header(header::CONTENT_LENGTH, length)
                .header(header::CONTENT_RANGE, format!("bytes {start}-{end}/{size}"))
                .header(header::ACCEPT_RANGES, "bytes")
                .body(body)
        }
        ByteRange::Full => {
            let body = Body::from_stream(ReaderStream::with_capacity(file, READ_CHUNK));

            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, content_type)
                .header(header::CONTENT_LENGTH, size)
                .header(header::ACCEPT_RANGES, "bytes")
                .body(body)
        }
    };

    response.map_err(|e| HostError::Internal(format!("Failed to build response: {e}")))
}

/// Serve a `localfile://` URL; unparseable URLs are 404s
pub async fn serve_media_url(url: &str, range: Option<&str>) -> Result<Response> {
    let path = parse_media_url(url)
        .ok_or_else(|| HostError::NotFound(format!("Not a media URL: {url}")))?;
    serve_file(&path, range).await
}
