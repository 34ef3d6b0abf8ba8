//! Scrobbling: "now playing" on load, one scrobble per load past the threshold

mod lastfm;
mod listenbrainz;
mod tracker;

pub use lastfm::{api_signature, LastfmClient, LastfmConfig, LASTFM_API_URL};
pub use listenbrainz::{ListenBrainzClient, LISTENBRAINZ_API_URL};
pub use tracker::{scrobble_threshold, ScrobbleSignal, ScrobbleTracker, MAX_SCROBBLE_THRESHOLD, MAX_TICK};

use crate::error::Result;
use crate::hub::StateConsumer;
use async_trait::async_trait;
use aurora_core::types::{UNKNOWN_ALBUM, UNKNOWN_ARTIST};
use aurora_core::{StateUpdate, Track};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{debug, info};

/// Timeout for scrobble submissions
pub const SCROBBLE_TIMEOUT: Duration = Duration::from_secs(10);

/// One listen of one track, as reported to scrobble services
#[derive(Debug, Clone, PartialEq)]
pub struct Listen {
    pub title: String,
    pub artist: String,
    /// `None` when the album is unknown
    pub album: Option<String>,
    pub album_artist: Option<String>,
    pub track_number: Option<u32>,
    /// Seconds
    pub duration: f64,
    pub started_at: DateTime<Utc>,
}

impl Listen {
    pub fn from_track(track: &Track, started_at: DateTime<Utc>) -> Self {
        let known = |s: &str, unknown: &str| (!s.is_empty() && s != unknown).then(|| s.to_string());
        Self {
            title: track.title.clone(),
            artist: track.artist.clone(),
            album: known(&track.album, UNKNOWN_ALBUM),
            album_artist: known(&track.album_artist, UNKNOWN_ARTIST)
                .filter(|a| *a != track.artist),
            track_number: (track.track > 0).then_some(track.track),
            duration: track.duration,
            started_at,
        }
    }
}

/// A listening-history service
#[async_trait]
pub trait ScrobbleService: Send + Sync {
    fn name(&self) -> &'static str;

    async fn now_playing(&self, listen: &Listen) -> Result<()>;

    async fn scrobble(&self, listen: &Listen) -> Result<()>;
}

/// Drives one scrobble service from state updates
pub struct ScrobbleConsumer<S> {
    service: S,
    tracker: ScrobbleTracker,
}

impl<S: ScrobbleService> ScrobbleConsumer<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            tracker: ScrobbleTracker::new(),
        }
    }
}

#[async_trait]
impl<S: ScrobbleService + 'static> StateConsumer for ScrobbleConsumer<S> {
    fn name(&self) -> &str {
        self.service.name()
    }

    async fn handle(&mut self, update: &StateUpdate) -> Result<()> {
        match self.tracker.observe(update, Utc::now()) {
            Some(ScrobbleSignal::NowPlaying(listen)) => {
                debug!(service = self.service.name(), title = %listen.title, "Now playing");
                self.service.now_playing(&listen).await
            }
            Some(ScrobbleSignal::Scrobble(listen)) => {
                info!(service = self.service.name(), title = %listen.title, artist = %listen.artist, "Scrobbling");
                self.service.scrobble(&listen).await
            }
            None => Ok(()),
        }
    }
}
