//! Content-derived identifiers
//!
//! Track, playlist and cover-art ids are the first 12 hex characters of the
//! MD5 digest of some stable input (a file path, an album name). The same
//! input always yields the same id, so re-scanning a folder never mints new
//! identities.

use md5::{Digest, Md5};

/// Length of a content id in hex characters
pub const CONTENT_ID_LEN: usize = 12;

/// Full lowercase hex MD5 digest of `input`
pub fn md5_hex(input: impl AsRef<[u8]>) -> String {
    hex::encode(Md5::digest(input.as_ref()))
}

/// Stable 12-character id derived from `input`
pub fn content_id(input: impl AsRef<[u8]>) -> String {
    let mut digest = md5_hex(input);
    digest.truncate(CONTENT_ID_LEN);
    digest
}

/// Id of the local track stored at `path`
pub fn track_id_for_path(path: &str) -> String {
    content_id(path)
}

/// Slug form of an album key: every non-alphanumeric character becomes `-`
pub fn slugify(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}
