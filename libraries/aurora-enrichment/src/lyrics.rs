//! Lyrics: local `.lrc` sidecars first, then LRCLIB

use crate::error::Result;
use crate::http::{build_url, EnrichmentConfig, HttpFetcher};
use aurora_core::Track;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const LRCLIB_BASE_URL: &str = "https://lrclib.net";

/// What LRCLIB needs to identify a recording
#[derive(Debug, Clone, PartialEq)]
pub struct LyricsQuery {
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Seconds
    pub duration: f64,
}

impl From<&Track> for LyricsQuery {
    fn from(track: &Track) -> Self {
        Self {
            title: track.title.clone(),
            artist: track.artist.clone(),
            album: track.album.clone(),
            duration: track.duration,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LyricsSource {
    /// Sidecar file next to the audio file
    Local,
    /// Fetched from LRCLIB
    Online,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lyrics {
    pub content: String,
    pub source: LyricsSource,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LrclibRecord {
    synced_lyrics: Option<String>,
    plain_lyrics: Option<String>,
}

impl LrclibRecord {
    fn best(self) -> Option<String> {
        non_empty(self.synced_lyrics).or_else(|| non_empty(self.plain_lyrics))
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.trim().is_empty())
}

/// `song.flac` -> `song.lrc` in the same directory
pub fn lrc_path_for(audio_path: &Path) -> PathBuf {
    audio_path.with_extension("lrc")
}

/// Read the `.lrc` sidecar of an audio file if there is one
pub async fn read_local_lyrics(audio_path: &Path) -> Option<String> {
    let lrc = lrc_path_for(audio_path);
    match tokio::fs::read_to_string(&lrc).await {
        Ok(content) => Some(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            warn!(path = %lrc.display(), error = %e, "Failed to read lyrics file");
            None
        }
    }
}

/// Write lyrics as the `.lrc` sidecar of an audio file
pub async fn save_lyrics(audio_path: &Path, content: &str) -> Result<PathBuf> {
    let lrc = lrc_path_for(audio_path);
    tokio::fs::write(&lrc, content).await?;
    info!(path = %lrc.display(), "Saved lyrics");
    Ok(lrc)
}

/// LRCLIB client
pub struct LyricsClient {
    fetcher: HttpFetcher,
    base_url: String,
}

impl LyricsClient {
    pub fn new(config: &EnrichmentConfig) -> Result<Self> {
        Ok(Self {
            fetcher: HttpFetcher::new(config)?,
            base_url: LRCLIB_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Exact match first, then a title/artist search preferring synced lyrics
    pub async fn fetch(&self, query: &LyricsQuery) -> Option<String> {
        match self.lookup(query).await {
            Ok(found) => found,
            Err(e) => {
                warn!(title = %query.title, artist = %query.artist, error = %e, "Lyrics lookup failed");
                None
            }
        }
    }

    /// Local sidecar, else online; online results are saved as a sidecar
    pub async fn find_lyrics(&self, audio_path: &Path, query: &LyricsQuery) -> Option<Lyrics> {
        if let Some(content) = read_local_lyrics(audio_path).await {
            return Some(Lyrics {
                content,
                source: LyricsSource::Local,
            });
        }

        let content = self.fetch(query).await?;
        if let Err(e) = save_lyrics(audio_path, &content).await {
            warn!(path = %audio_path.display(), error = %e, "Failed to save lyrics file");
        }
        Some(Lyrics {
            content,
            source: LyricsSource::Online,
        })
    }

    async fn lookup(&self, query: &LyricsQuery) -> Result<Option<String>> {
        let duration = query.duration.round().max(0.0).to_string();
        let exact = build_url(
            &self.base_url,
            "/api/get",
            &[
                ("track_name", query.title.as_str()),
                ("artist_name", query.artist.as_str()),
                ("album_name", query.album.as_str()),
                ("duration", duration.as_str()),
            ],
        )?;

        if let Some(found) = self
            .fetcher
            .get_json::<LrclibRecord>(&exact)
            .await?
            .and_then(LrclibRecord::best)
        {
            debug!(title = %query.title, "Exact lyrics match");
            return Ok(Some(found));
        }

        let search = build_url(
            &self.base_url,
            "/api/search",
            &[
                ("track_name", query.title.as_str()),
                ("artist_name", query.artist.as_str()),
            ],
        )?;
        let results: Vec<LrclibRecord> = self.fetcher.get_json(&search).await?.unwrap_or_default();

        let index = results
            .iter()
            .position(|r| r.synced_lyrics.as_deref().is_some_and(|s| !s.trim().is_empty()))
            .unwrap_or(0);
        Ok(results.into_iter().nth(index).and_then(LrclibRecord::best))
    }
}
