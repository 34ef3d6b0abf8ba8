//! Artist info: MusicBrainz search, then the Wikipedia page summary

use crate::error::{EnrichmentError, Result};
use crate::http::{build_url, EnrichmentConfig, HttpFetcher};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const MUSICBRAINZ_BASE_URL: &str = "https://musicbrainz.org";
pub const WIKIPEDIA_BASE_URL: &str = "https://en.wikipedia.org";

/// Matches scoring below this are treated as misses
const MIN_MATCH_SCORE: u32 = 80;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistInfo {
    pub name: String,
    /// MusicBrainz id
    pub mbid: String,
    pub kind: Option<String>,
    pub country: Option<String>,
    pub disambiguation: Option<String>,
    pub active_from: Option<String>,
    pub active_until: Option<String>,
    pub biography: Option<String>,
    pub wikipedia_url: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ArtistSearch {
    #[serde(default)]
    artists: Vec<MbArtist>,
}

#[derive(Debug, Deserialize)]
struct MbArtist {
    id: String,
    name: String,
    #[serde(default)]
    score: Option<u32>,
    #[serde(rename = "type")]
    kind: Option<String>,
    country: Option<String>,
    disambiguation: Option<String>,
    #[serde(rename = "life-span")]
    life_span: Option<LifeSpan>,
}

#[derive(Debug, Deserialize)]
struct LifeSpan {
    begin: Option<String>,
    end: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PageSummary {
    #[serde(rename = "type")]
    kind: Option<String>,
    extract: Option<String>,
    content_urls: Option<ContentUrls>,
    thumbnail: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct ContentUrls {
    desktop: Option<PageUrl>,
}

#[derive(Debug, Deserialize)]
struct PageUrl {
    page: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    source: String,
}

/// Two-hop artist lookup
///
/// MusicBrainz requests are spaced by the configured interval (1 s by default)
/// as required by their usage policy.
pub struct ArtistInfoClient {
    musicbrainz: HttpFetcher,
    wikipedia: HttpFetcher,
    musicbrainz_url: String,
    wikipedia_url: String,
}

impl ArtistInfoClient {
    pub fn new(config: &EnrichmentConfig) -> Result<Self> {
        Ok(Self {
            musicbrainz: HttpFetcher::new(config)?.rate_limited(config.musicbrainz_interval),
            wikipedia: HttpFetcher::new(config)?,
            musicbrainz_url: MUSICBRAINZ_BASE_URL.to_string(),
            wikipedia_url: WIKIPEDIA_BASE_URL.to_string(),
        })
    }

    pub fn with_base_urls(
        mut self,
        musicbrainz: impl Into<String>,
        wikipedia: impl Into<String>,
    ) -> Self {
        self.musicbrainz_url = musicbrainz.into();
        self.wikipedia_url = wikipedia.into();
        self
    }

    /// Look up an artist by name; `None` when unknown or on any failure
    pub async fn lookup(&self, name: &str) -> Option<ArtistInfo> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        match self.lookup_inner(name).await {
            Ok(info) => info,
            Err(e) => {
                warn!(artist = name, error = %e, "Artist info lookup failed");
                None
            }
        }
    }

    async fn lookup_inner(&self, name: &str) -> Result<Option<ArtistInfo>> {
        let query = format!("artist:\"{}\"", name.replace('"', ""));
        let url = build_url(
            &self.musicbrainz_url,
            "/ws/2/artist",
            &[("query", query.as_str()), ("fmt", "json"), ("limit", "1")],
        )?;

        let search: ArtistSearch = self.musicbrainz.get_json(&url).await?.unwrap_or_default();
        let Some(artist) = search
            .artists
            .into_iter()
            .next()
            .filter(|a| a.score.unwrap_or(100) >= MIN_MATCH_SCORE)
        else {
            debug!(artist = name, "No MusicBrainz match");
            return Ok(None);
        };

        let life_span = artist.life_span;
        let mut info = ArtistInfo {
            name: artist.name,
            mbid: artist.id,
            kind: artist.kind,
            country: artist.country,
            disambiguation: artist.disambiguation.filter(|d| !d.is_empty()),
            active_from: life_span.as_ref().and_then(|l| l.begin.clone()),
            active_until: life_span.and_then(|l| l.end),
            ..Default::default()
        };

        // The biography is optional; a Wikipedia failure keeps the MusicBrainz data
        match self.summary(&info.name).await {
            Ok(Some(summary)) if summary.kind.as_deref() != Some("disambiguation") => {
                info.biography = summary.extract.filter(|e| !e.is_empty());
                info.wikipedia_url = summary.content_urls.and_then(|c| c.desktop).and_then(|d| d.page);
                info.image_url = summary.thumbnail.map(|t| t.source);
            }
            Ok(_) => {}
            Err(e) => warn!(artist = %info.name, error = %e, "Wikipedia summary failed"),
        }

        Ok(Some(info))
    }

    async fn summary(&self, title: &str) -> Result<Option<PageSummary>> {
        let mut url = build_url(&self.wikipedia_url, "/api/rest_v1/page/summary", &[])?;
        url.path_segments_mut()
            .map_err(|()| EnrichmentError::InvalidUrl(self.wikipedia_url.clone()))?
            .push(&title.replace(' ', "_"));
        self.wikipedia.get_json(&url).await
    }
}
