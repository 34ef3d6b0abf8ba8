//! Aurora Player - Enrichment
//!
//! Optional online lookups that decorate the library:
//! - Album art URLs from the iTunes search API (LRU cached)
//! - Lyrics from `.lrc` sidecars or LRCLIB, plus an LRC parser
//! - Artist info from MusicBrainz and Wikipedia
//!
//! None of these are on the playback path. Every lookup has a finite timeout,
//! retries transient failures (5xx, timeouts, connect errors) with backoff,
//! never retries client errors, and degrades to `None` on failure.

pub mod artist_info;
pub mod artwork;
pub mod error;
pub mod http;
pub mod lrc;
pub mod lyrics;

pub use artist_info::{ArtistInfo, ArtistInfoClient};
pub use artwork::{upscale_artwork_url, AlbumArtClient};
pub use error::{EnrichmentError, Result};
pub use http::{EnrichmentConfig, HttpFetcher, RateLimiter};
pub use lrc::{find_current_line, is_synced, parse_lrc, LyricLine};
pub use lyrics::{
    lrc_path_for, read_local_lyrics, save_lyrics, Lyrics, LyricsClient, LyricsQuery, LyricsSource,
};

/// All enrichment clients behind one configuration
pub struct Enrichment {
    pub art: AlbumArtClient,
    pub lyrics: LyricsClient,
    pub artists: ArtistInfoClient,
}

impl Enrichment {
    pub fn new(config: &EnrichmentConfig) -> Result<Self> {
        Ok(Self {
            art: AlbumArtClient::new(config)?,
            lyrics: LyricsClient::new(config)?,
            artists: ArtistInfoClient::new(config)?,
        })
    }
}
