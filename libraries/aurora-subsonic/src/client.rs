//! Subsonic client.

use crate::auth::auth_params;
use crate::error::{Result, SubsonicError};
use crate::types::{
    AlbumList, ApiError, ArtistIndexes, SearchResults, SubsonicAlbum, SubsonicArtist,
    SubsonicConfig, SubsonicSong,
};
use aurora_core::types::{RawTrack, Track, TrackSource, UNKNOWN_TITLE};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Albums requested per `getAlbumList2` page
pub const ALBUM_PAGE_SIZE: usize = 500;
/// Cover size requested for track artwork
pub const DEFAULT_COVER_SIZE: u32 = 512;
/// Path scheme for remote tracks
pub const REMOTE_SCHEME: &str = "subsonic://";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Song id behind a `subsonic://<id>` track path
pub fn song_id_from_path(path: &str) -> Option<&str> {
    path.strip_prefix(REMOTE_SCHEME).filter(|id| !id.is_empty())
}

/// Client for a Subsonic-compatible server (Navidrome, Airsonic, ...).
///
/// Configuration lives behind a lock so URL builders stay synchronous and can
/// be called from the playback path.
///
/// # Example
///
/// ```ignore
/// use aurora_subsonic::{SubsonicClient, SubsonicConfig};
///
/// let client = SubsonicClient::new()?;
/// client.configure(SubsonicConfig::new("https://music.example.com", "me", "pw"))?;
/// if client.ping().await {
///     let tracks = client.fetch_all_songs().await?;
///     println!("{} remote tracks", tracks.len());
/// }
/// ```
pub struct SubsonicClient {
    http: Client,
    config: RwLock<Option<SubsonicConfig>>,
    page_size: usize,
}

impl SubsonicClient {
    /// Create an unconfigured client.
    pub fn new() -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(format!("AuroraPlayer/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            config: RwLock::new(None),
            page_size: ALBUM_PAGE_SIZE,
        })
    }

    /// Create a client and configure it in one step.
    pub fn with_config(config: SubsonicConfig) -> Result<Self> {
        let client = Self::new()?;
        client.configure(config)?;
        Ok(client)
    }

    /// Override the album page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Validate and store server settings.
    pub fn configure(&self, config: SubsonicConfig) -> Result<()> {
        if config.url.trim().is_empty() {
            return Err(SubsonicError::InvalidUrl("URL cannot be empty".into()));
        }
        let url = config.url.trim().trim_end_matches('/').to_string();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(SubsonicError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }
        Url::parse(&url).map_err(|e| SubsonicError::InvalidUrl(e.to_string()))?;

        info!(url = %url, username = %config.username, legacy = config.legacy_auth, "Subsonic configured");
        *self.config.write().unwrap_or_else(PoisonError::into_inner) =
            Some(SubsonicConfig { url, ..config });
        Ok(())
    }

    /// Forget the configured server.
    pub fn clear(&self) {
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn config(&self) -> Option<SubsonicConfig> {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_configured(&self) -> bool {
        self.config().is_some()
    }

    /// Signed URL for a REST endpoint.
    pub fn endpoint_url(&self, endpoint: &str, extra: &[(&str, &str)]) -> Result<Url> {
        let config = self.config().ok_or(SubsonicError::NotConfigured)?;
        let mut url = Url::parse(&format!("{}/rest/{}", config.url, endpoint))
            .map_err(|e| SubsonicError::InvalidUrl(e.to_string()))?;
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in auth_params(&config) {
                query.append_pair(key, &value);
            }
            for (key, value) in extra {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Signed streaming URL for a song id.
    pub fn stream_url(&self, song_id: &str) -> Result<String> {
        Ok(self.endpoint_url("stream", &[("id", song_id)])?.into())
    }

    /// Signed cover-art URL.
    pub fn cover_art_url(&self, cover_id: &str, size: u32) -> Result<String> {
        let size = size.to_string();
        Ok(self
            .endpoint_url("getCoverArt", &[("id", cover_id), ("size", &size)])?
            .into())
    }

    /// Issue a request and return the `subsonic-response` body.
    async fn api_request(&self, endpoint: &str, extra: &[(&str, &str)]) -> Result<Map<String, Value>> {
        let url = self.endpoint_url(endpoint, extra)?;
        debug!(endpoint, "Subsonic request");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SubsonicError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let mut envelope: Map<String, Value> = response
            .json()
            .await
            .map_err(|e| SubsonicError::ParseError(e.to_string()))?;
        let body = match envelope.remove("subsonic-response") {
            Some(Value::Object(body)) => body,
            _ => {
                return Err(SubsonicError::ParseError(
                    "missing subsonic-response".into(),
                ))
            }
        };

        if body.get("status").and_then(Value::as_str) != Some("ok") {
            let error: ApiError = body
                .get("error")
                .cloned()
                .map(serde_json::from_value)
                .transpose()
                .map_err(|e| SubsonicError::ParseError(e.to_string()))?
                .unwrap_or_default();
            return Err(SubsonicError::Api {
                code: error.code,
                message: error.message.unwrap_or_else(|| "Unknown error".into()),
            });
        }

        Ok(body)
    }

    /// Request `endpoint` and decode the object under `field`.
    async fn fetch<T>(&self, endpoint: &str, extra: &[(&str, &str)], field: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        let mut body = self.api_request(endpoint, extra).await?;
        match body.remove(field) {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| SubsonicError::ParseError(format!("{endpoint}: {e}"))),
            None => Ok(T::default()),
        }
    }

    /// Whether the server answers and accepts our credentials.
    pub async fn ping(&self) -> bool {
        match self.api_request("ping", &[]).await {
            Ok(_) => true,
            Err(e) => {
                debug!(error = %e, "Subsonic ping failed");
                false
            }
        }
    }

    /// One page of albums in alphabetical order.
    pub async fn album_page(&self, offset: usize) -> Result<Vec<SubsonicAlbum>> {
        let size = self.page_size.to_string();
        let offset = offset.to_string();
        let list: AlbumList = self
            .fetch(
                "getAlbumList2",
                &[
                    ("type", "alphabeticalByName"),
                    ("size", &size),
                    ("offset", &offset),
                ],
                "albumList2",
            )
            .await?;
        Ok(list.album)
    }

    /// Every album, paging until a short page.
    pub async fn fetch_all_albums(&self) -> Result<Vec<SubsonicAlbum>> {
        let mut albums = Vec::new();
        let mut offset = 0;
        loop {
            let page = self.album_page(offset).await?;
            let len = page.len();
            albums.extend(page);
            if len < self.page_size {
                break;
            }
            offset += self.page_size;
        }
        Ok(albums)
    }

    /// Album detail including its songs.
    pub async fn get_album(&self, id: &str) -> Result<SubsonicAlbum> {
        let album: Option<SubsonicAlbum> = self.fetch("getAlbum", &[("id", id)], "album").await?;
        album.ok_or_else(|| SubsonicError::ParseError(format!("album {id} missing from response")))
    }

    /// Every song on the server, assembled album by album.
    ///
    /// Albums that fail to load are logged and skipped.
    pub async fn fetch_all_songs(&self) -> Result<Vec<Track>> {
        let albums = self.fetch_all_albums().await?;
        let mut tracks = Vec::new();

        for album in &albums {
            match self.get_album(&album.id).await {
                Ok(detail) => tracks.extend(detail.song.iter().map(|s| self.song_to_track(s))),
                Err(e) => warn!(album = %album.id, error = %e, "Failed to fetch album, skipping"),
            }
        }

        info!(albums = albums.len(), tracks = tracks.len(), "Fetched remote library");
        Ok(tracks)
    }

    /// Every artist across all index groups.
    pub async fn get_artists(&self) -> Result<Vec<SubsonicArtist>> {
        let indexes: ArtistIndexes = self.fetch("getArtists", &[], "artists").await?;
        Ok(indexes.index.into_iter().flat_map(|group| group.artist).collect())
    }

    /// Artist detail including albums.
    pub async fn get_artist(&self, id: &str) -> Result<SubsonicArtist> {
        let artist: Option<SubsonicArtist> =
            self.fetch("getArtist", &[("id", id)], "artist").await?;
        artist.ok_or_else(|| SubsonicError::ParseError(format!("artist {id} missing from response")))
    }

    /// Free-text search across artists, albums and songs.
    pub async fn search(&self, query: &str) -> Result<SearchResults> {
        self.fetch(
            "search3",
            &[
                ("query", query),
                ("artistCount", "20"),
                ("albumCount", "20"),
                ("songCount", "50"),
            ],
            "searchResult3",
        )
        .await
    }

    /// Map a remote song into the library track shape.
    pub fn song_to_track(&self, song: &SubsonicSong) -> Track {
        let cover_art = song
            .cover_art
            .as_deref()
            .and_then(|id| self.cover_art_url(id, DEFAULT_COVER_SIZE).ok());

        RawTrack {
            title: song.title.clone(),
            artist: song.artist.clone(),
            album: song.album.clone(),
            album_artist: song.album_artist.clone(),
            track: song.track,
            disc: song.disc_number,
            duration: song.duration,
            genre: song.genre.clone(),
            year: song.year,
            cover_art,
            ..Default::default()
        }
        .normalize_with_id(
            format!("subsonic-{}", song.id),
            &format!("{REMOTE_SCHEME}{}", song.id),
            UNKNOWN_TITLE,
            TrackSource::Subsonic,
        )
    }

    /// Streaming URL for a `subsonic://` track path.
    pub fn stream_url_for_path(&self, path: &str) -> Result<String> {
        let id = song_id_from_path(path)
            .ok_or_else(|| SubsonicError::InvalidUrl(format!("not a remote track: {path}")))?;
        self.stream_url(id)
    }
}
