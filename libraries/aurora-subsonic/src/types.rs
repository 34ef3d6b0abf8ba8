//! Configuration and wire types for the Subsonic REST API.

use serde::{Deserialize, Deserializer, Serialize};

/// Connection settings for a Subsonic-compatible server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubsonicConfig {
    /// Server base URL, e.g. `https://navidrome.example.com`
    pub url: String,
    pub username: String,
    pub password: String,
    /// Send the hex-encoded password instead of a salted token
    #[serde(default)]
    pub legacy_auth: bool,
}

impl SubsonicConfig {
    pub fn new(
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            username: username.into(),
            password: password.into(),
            legacy_auth: false,
        }
    }

    /// Switch to legacy `p=enc:` authentication.
    pub fn with_legacy_auth(mut self, legacy: bool) -> Self {
        self.legacy_auth = legacy;
        self
    }
}

/// A song as returned inside `getAlbum`, `search3` and friends.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubsonicSong {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub album_artist: Option<String>,
    pub track: Option<u32>,
    pub disc_number: Option<u32>,
    pub duration: Option<f64>,
    pub genre: Option<String>,
    pub year: Option<u32>,
    pub cover_art: Option<String>,
    pub suffix: Option<String>,
    pub bit_rate: Option<u32>,
}

/// Album entry from `getAlbumList2`, or album detail from `getAlbum`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubsonicAlbum {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub artist: Option<String>,
    pub artist_id: Option<String>,
    pub cover_art: Option<String>,
    pub song_count: Option<u32>,
    pub duration: Option<f64>,
    pub year: Option<u32>,
    /// Present only in album detail responses
    #[serde(default, deserialize_with = "one_or_many")]
    pub song: Vec<SubsonicSong>,
}

/// Artist entry from `getArtists`, or artist detail from `getArtist`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubsonicArtist {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub cover_art: Option<String>,
    pub album_count: Option<u32>,
    /// Present only in artist detail responses
    #[serde(default, deserialize_with = "one_or_many")]
    pub album: Vec<SubsonicAlbum>,
}

/// Result of a `search3` query.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchResults {
    #[serde(default, rename = "artist", deserialize_with = "one_or_many")]
    pub artists: Vec<SubsonicArtist>,
    #[serde(default, rename = "album", deserialize_with = "one_or_many")]
    pub albums: Vec<SubsonicAlbum>,
    #[serde(default, rename = "song", deserialize_with = "one_or_many")]
    pub songs: Vec<SubsonicSong>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AlbumList {
    #[serde(default, deserialize_with = "one_or_many")]
    pub album: Vec<SubsonicAlbum>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ArtistIndexes {
    #[serde(default, deserialize_with = "one_or_many")]
    pub index: Vec<ArtistIndex>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ArtistIndex {
    #[serde(default, deserialize_with = "one_or_many")]
    pub artist: Vec<SubsonicArtist>,
}

/// Error object inside a failed `subsonic-response`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

/// Some servers collapse single-element arrays into a bare object.
fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        Some(OneOrMany::Many(items)) => items,
        Some(OneOrMany::One(item)) => vec![item],
        None => Vec::new(),
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    })
}
