/// Artist domain types
use super::{Track, UNKNOWN_ARTIST};
use serde::{Deserialize, Serialize};

/// Artist derived from the track set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    pub name: String,
    pub track_count: usize,
    pub album_count: usize,
}

/// Resolved artist name of a track: album artist, then artist, then the sentinel
pub fn artist_name(track: &Track) -> &str {
    [track.album_artist.as_str(), track.artist.as_str()]
        .into_iter()
        .find(|name| !name.is_empty())
        .unwrap_or(UNKNOWN_ARTIST)
}
