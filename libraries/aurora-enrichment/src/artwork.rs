//! Album art lookup through the iTunes search API

use crate::error::Result;
use crate::http::{build_url, EnrichmentConfig, HttpFetcher};
use lru::LruCache;
use serde::Deserialize;
use std::num::NonZeroUsize;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

pub const ITUNES_BASE_URL: &str = "https://itunes.apple.com";

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<AlbumResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AlbumResult {
    artwork_url100: Option<String>,
}

/// Swap the 100px thumbnail size for the 512px rendition
pub fn upscale_artwork_url(url: &str) -> String {
    url.replace("100x100bb", "512x512bb")
}

/// Looks up cover art URLs by artist and album, with an LRU cache
///
/// Definitive answers (found or not found) are cached; failed requests are
/// not, so a later call can try again.
pub struct AlbumArtClient {
    fetcher: HttpFetcher,
    base_url: String,
    cache: Mutex<LruCache<String, Option<String>>>,
}

impl AlbumArtClient {
    pub fn new(config: &EnrichmentConfig) -> Result<Self> {
        let capacity = NonZeroUsize::new(config.art_cache_size).unwrap_or(NonZeroUsize::MIN);
        Ok(Self {
            fetcher: HttpFetcher::new(config)?,
            base_url: ITUNES_BASE_URL.to_string(),
            cache: Mutex::new(LruCache::new(capacity)),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// 512px cover URL for an album, or `None`
    pub async fn album_art_url(&self, artist: &str, album: &str) -> Option<String> {
        let key = format!("{artist}---{album}").to_lowercase();
        if let Some(cached) = self.cache().get(&key) {
            return cached.clone();
        }

        match self.search(artist, album).await {
            Ok(found) => {
                debug!(artist, album, found = found.is_some(), "Album art lookup");
                self.cache().put(key, found.clone());
                found
            }
            Err(e) => {
                warn!(artist, album, error = %e, "Album art lookup failed");
                None
            }
        }
    }

    pub fn clear_cache(&self) {
        self.cache().clear();
    }

    fn cache(&self) -> std::sync::MutexGuard<'_, LruCache<String, Option<String>>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn search(&self, artist: &str, album: &str) -> Result<Option<String>> {
        let term = format!("{artist} {album}");
        let url = build_url(
            &self.base_url,
            "/search",
            &[("term", term.as_str()), ("entity", "album"), ("limit", "3")],
        )?;

        let response: SearchResponse = self.fetcher.get_json(&url).await?.unwrap_or_default();
        Ok(response
            .results
            .into_iter()
            .next()
            .and_then(|r| r.artwork_url100)
            .map(|u| upscale_artwork_url(&u)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upscales_thumbnail_url() {
        assert_eq!(
            upscale_artwork_url("https://is1.mzstatic.com/a/100x100bb.jpg"),
            "https://is1.mzstatic.com/a/512x512bb.jpg"
        );
        assert_eq!(upscale_artwork_url("https://x/600.jpg"), "https://x/600.jpg");
    }
}
