//! Rich presence ("now listening" status in chat clients)

use crate::error::Result;
use crate::hub::StateConsumer;
use async_trait::async_trait;
use aurora_core::settings::{SETTING_PRESENCE_ENABLED, SETTING_PRESENCE_FORMAT};
use aurora_core::{PlaybackStatus, Settings, StateUpdate, Track};
use aurora_enrichment::AlbumArtClient;
use serde::Serialize;
use std::sync::Arc;

/// Character limit for every presence text field
pub const FIELD_LIMIT: usize = 128;
/// Image shown when no album art was found
pub const FALLBACK_IMAGE_KEY: &str = "aurora_icon";
pub const FALLBACK_IMAGE_TEXT: &str = "Aurora Player";

/// How track fields are laid out on the two presence lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PresenceFormat {
    #[default]
    TitleArtist,
    ArtistTitle,
    TitleAlbum,
    Full,
    Minimal,
}

impl PresenceFormat {
    /// Parse a stored format name; unknown names fall back to `title-artist`
    pub fn parse(s: &str) -> Self {
        match s {
            "artist-title" => Self::ArtistTitle,
            "title-album" => Self::TitleAlbum,
            "full" => Self::Full,
            "minimal" => Self::Minimal,
            _ => Self::TitleArtist,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TitleArtist => "title-artist",
            Self::ArtistTitle => "artist-title",
            Self::TitleAlbum => "title-album",
            Self::Full => "full",
            Self::Minimal => "minimal",
        }
    }
}

/// Activity payload handed to a [`PresencePublisher`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Presence {
    pub name: String,
    pub details: String,
    pub state: Option<String>,
    pub large_image_key: String,
    pub large_image_text: String,
    /// Unix epoch milliseconds
    pub start_timestamp: Option<i64>,
    pub end_timestamp: Option<i64>,
}

/// First `limit` characters of `s`
pub fn truncate(s: &str, limit: usize) -> String {
    s.chars().take(limit).collect()
}

/// Lay out a presence for `track` at `elapsed` seconds into it
pub fn build_presence(
    track: &Track,
    elapsed: f64,
    duration: f64,
    format: PresenceFormat,
    art_url: Option<&str>,
    now_ms: i64,
) -> Presence {
    let (details, state) = match format {
        PresenceFormat::TitleArtist => (track.title.clone(), format!("by {}", track.artist)),
        PresenceFormat::ArtistTitle => (track.artist.clone(), track.title.clone()),
        PresenceFormat::TitleAlbum => (track.title.clone(), format!("on {}", track.album)),
        PresenceFormat::Full => (
            format!("{} by {}", track.title, track.artist),
            track.album.clone(),
        ),
        PresenceFormat::Minimal => (track.title.clone(), String::new()),
    };

    let (large_image_key, large_image_text) = match art_url {
        Some(url) if !track.album.is_empty() => (url.to_string(), track.album.clone()),
        Some(url) => (url.to_string(), FALLBACK_IMAGE_TEXT.to_string()),
        None => (FALLBACK_IMAGE_KEY.to_string(), FALLBACK_IMAGE_TEXT.to_string()),
    };

    let (start_timestamp, end_timestamp) = if duration > 0.0 {
        let elapsed_ms = (elapsed.max(0.0) * 1000.0) as i64;
        let remaining_ms = ((duration - elapsed).max(0.0) * 1000.0) as i64;
        (Some(now_ms - elapsed_ms), Some(now_ms + remaining_ms))
    } else {
        (None, None)
    };

    Presence {
        name: truncate(&format!("{} by {}", track.title, track.artist), FIELD_LIMIT),
        details: truncate(&details, FIELD_LIMIT),
        state: (!state.is_empty()).then(|| truncate(&state, FIELD_LIMIT)),
        large_image_key,
        large_image_text: truncate(&large_image_text, FIELD_LIMIT),
        start_timestamp,
        end_timestamp,
    }
}

/// Chat client presence collaborator
#[async_trait]
pub trait PresencePublisher: Send {
    async fn set_activity(&mut self, presence: &Presence) -> Result<()>;

    async fn clear_activity(&mut self) -> Result<()>;
}

/// Album art lookup used to decorate the presence
#[async_trait]
pub trait ArtworkLookup: Send + Sync {
    async fn album_art_url(&self, artist: &str, album: &str) -> Option<String>;
}

#[async_trait]
impl ArtworkLookup for AlbumArtClient {
    async fn album_art_url(&self, artist: &str, album: &str) -> Option<String> {
        AlbumArtClient::album_art_url(self, artist, album).await
    }
}

/// Keeps a presence in step with playback; cleared whenever not playing
pub struct PresenceConsumer {
    publisher: Box<dyn PresencePublisher>,
    artwork: Option<Arc<dyn ArtworkLookup>>,
    format: PresenceFormat,
    track: Option<Track>,
    status: PlaybackStatus,
    current_time: f64,
    duration: f64,
    shown: bool,
}

impl PresenceConsumer {
    pub fn new(publisher: Box<dyn PresencePublisher>, format: PresenceFormat) -> Self {
        Self {
            publisher,
            artwork: None,
            format,
            track: None,
            status: PlaybackStatus::Stopped,
            current_time: 0.0,
            duration: 0.0,
            shown: false,
        }
    }

    /// `None` when presence is switched off in settings
    pub fn from_settings(publisher: Box<dyn PresencePublisher>, settings: &Settings) -> Option<Self> {
        if settings.get_bool(SETTING_PRESENCE_ENABLED) == Some(false) {
            return None;
        }
        let format = settings
            .get_str(SETTING_PRESENCE_FORMAT)
            .map(PresenceFormat::parse)
            .unwrap_or_default();
        Some(Self::new(publisher, format))
    }

    pub fn with_artwork(mut self, artwork: Arc<dyn ArtworkLookup>) -> Self {
        self.artwork = Some(artwork);
        self
    }

    async fn refresh(&mut self) -> Result<()> {
        let track = match &self.track {
            Some(track) if self.status == PlaybackStatus::Playing => track.clone(),
            _ => {
                if self.shown {
                    self.shown = false;
                    self.publisher.clear_activity().await?;
                }
                return Ok(());
            }
        };

        let art_url = match &self.artwork {
            Some(lookup) => lookup.album_art_url(&track.artist, &track.album).await,
            None => None,
        };
        let presence = build_presence(
            &track,
            self.current_time,
            self.duration,
            self.format,
            art_url.as_deref(),
            chrono::Utc::now().timestamp_millis(),
        );
        self.shown = true;
        self.publisher.set_activity(&presence).await
    }
}

#[async_trait]
impl StateConsumer for PresenceConsumer {
    fn name(&self) -> &str {
        "presence"
    }

    async fn handle(&mut self, update: &StateUpdate) -> Result<()> {
        match update {
            StateUpdate::TrackChanged { track, .. } => {
                self.duration = track.duration;
                self.current_time = 0.0;
                self.track = Some(track.clone());
                self.refresh().await
            }
            StateUpdate::TrackCleared => {
                self.track = None;
                self.refresh().await
            }
            // Loading is transient; keep whatever is shown until it settles
            StateUpdate::StatusChanged { status } if *status != PlaybackStatus::Loading => {
                self.status = *status;
                self.refresh().await
            }
            StateUpdate::Position {
                current_time,
                duration,
            } => {
                self.current_time = *current_time;
                if *duration > 0.0 {
                    self.duration = *duration;
                }
                Ok(())
            }
            StateUpdate::Seeked { position } => {
                self.current_time = *position;
                if self.status == PlaybackStatus::Playing {
                    self.refresh().await
                } else {
                    Ok(())
                }
            }
            _ => Ok(()),
        }
    }

    async fn shutdown(&mut self) -> Result<()> {
        if self.shown {
            self.shown = false;
            self.publisher.clear_activity().await?;
        }
        Ok(())
    }
}
