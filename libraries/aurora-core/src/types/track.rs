/// Track domain types
use crate::ids::track_id_for_path;
use serde::{Deserialize, Deserializer, Serialize};

/// Fallback artist name
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
/// Fallback album name
pub const UNKNOWN_ALBUM: &str = "Unknown Album";
/// Fallback title for remote songs without one
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Where a track's bytes come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackSource {
    /// File on the local filesystem
    #[default]
    Local,
    /// Song on a Subsonic-compatible server
    Subsonic,
}

/// Optional credit fields read from extended tags
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackCredits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lyricist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conductor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub producer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engineer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mixer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remixer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoded_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bpm: Option<u32>,
}

impl TrackCredits {
    /// True when no credit field is set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One playable audio item with normalized metadata
///
/// Serialized in camelCase so the persisted library file stays readable by
/// earlier releases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Content-derived id (hash of the path for local files)
    pub id: String,

    /// Local filesystem path or `subsonic://<id>`
    pub path: String,

    pub title: String,
    pub artist: String,
    pub album: String,
    pub album_artist: String,

    /// Track number within the disc (0 when unknown)
    #[serde(default)]
    pub track: u32,

    /// Disc number (1 when unknown)
    #[serde(default = "default_disc")]
    pub disc: u32,

    /// Duration in seconds; always finite and non-negative
    #[serde(default, deserialize_with = "lenient_duration")]
    pub duration: f64,

    #[serde(default)]
    pub genre: String,

    /// Release year (0 when unknown)
    #[serde(default)]
    pub year: u32,

    /// Cached cover image path, remote cover URL, or none
    #[serde(default)]
    pub cover_art: Option<String>,

    #[serde(default)]
    pub source: TrackSource,

    #[serde(flatten)]
    pub credits: TrackCredits,
}

fn default_disc() -> u32 {
    1
}

fn lenient_duration<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer).map(normalize_duration)
}

/// Clamp a raw duration to a finite, non-negative number of seconds
pub fn normalize_duration(raw: Option<f64>) -> f64 {
    match raw {
        Some(secs) if secs.is_finite() && secs > 0.0 => secs,
        _ => 0.0,
    }
}

impl Track {
    /// Placeholder track for a local file whose tags could not be read
    pub fn degraded(path: &str, file_stem: &str) -> Self {
        RawTrack::default().normalize(path, file_stem, TrackSource::Local)
    }

    /// Whether this track is served by a remote server
    pub fn is_remote(&self) -> bool {
        self.source == TrackSource::Subsonic
    }

    /// Artist name used for the artist index
    pub fn index_artist(&self) -> &str {
        super::artist_name(self)
    }
}

/// Tag values as read from a file or a remote server, before defaults apply
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTrack {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub album_artist: Option<String>,
    pub track: Option<u32>,
    pub disc: Option<u32>,
    pub duration: Option<f64>,
    pub genre: Option<String>,
    pub year: Option<u32>,
    pub cover_art: Option<String>,
    pub credits: TrackCredits,
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl RawTrack {
    /// Apply the field-default table and mint the local id for `path`
    ///
    /// | field        | default                         |
    /// |--------------|---------------------------------|
    /// | title        | `fallback_title`                |
    /// | artist       | `Unknown Artist`                |
    /// | album        | `Unknown Album`                 |
    /// | album artist | artist, else `Unknown Artist`   |
    /// | track        | 0                               |
    /// | disc         | 1 (0 is treated as missing)     |
    /// | duration     | 0 (also for NaN, inf, negative) |
    /// | genre        | empty                           |
    /// | year         | 0                               |
    pub fn normalize(self, path: &str, fallback_title: &str, source: TrackSource) -> Track {
        self.normalize_with_id(track_id_for_path(path), path, fallback_title, source)
    }

    /// Same as [`RawTrack::normalize`] with an explicit id
    pub fn normalize_with_id(
        self,
        id: String,
        path: &str,
        fallback_title: &str,
        source: TrackSource,
    ) -> Track {
        let artist = present(self.artist);
        let album_artist = present(self.album_artist)
            .or_else(|| artist.clone())
            .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());

        Track {
            id,
            path: path.to_string(),
            title: present(self.title).unwrap_or_else(|| fallback_title.to_string()),
            artist: artist.unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
            album: present(self.album).unwrap_or_else(|| UNKNOWN_ALBUM.to_string()),
            album_artist,
            track: self.track.unwrap_or(0),
            disc: self.disc.filter(|d| *d > 0).unwrap_or(1),
            duration: normalize_duration(self.duration),
            genre: present(self.genre).unwrap_or_default(),
            year: self.year.unwrap_or(0),
            cover_art: present(self.cover_art),
            source,
            credits: self.credits,
        }
    }
}
