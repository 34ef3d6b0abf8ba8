//! Last.fm scrobbling (`track.updateNowPlaying`, `track.scrobble`)

use super::{Listen, ScrobbleService, SCROBBLE_TIMEOUT};
use crate::error::{Result, SyncError};
use async_trait::async_trait;
use aurora_core::ids::md5_hex;
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;

pub const LASTFM_API_URL: &str = "https://ws.audioscrobbler.com/2.0/";

const SERVICE: &str = "Last.fm";

/// Credentials for an authenticated Last.fm session
#[derive(Debug, Clone)]
pub struct LastfmConfig {
    pub api_key: String,
    pub api_secret: String,
    pub session_key: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: i64,
    #[serde(default)]
    message: String,
}

/// `api_sig`: md5 of every parameter `key + value` in key order, then the
/// secret. `format` and `callback` are not signed.
pub fn api_signature(params: &BTreeMap<String, String>, secret: &str) -> String {
    let mut raw = String::new();
    for (key, value) in params {
        if key == "format" || key == "callback" {
            continue;
        }
        raw.push_str(key);
        raw.push_str(value);
    }
    raw.push_str(secret);
    md5_hex(raw)
}

pub struct LastfmClient {
    http: Client,
    config: LastfmConfig,
    api_url: String,
}

impl LastfmClient {
    pub fn new(config: LastfmConfig) -> Result<Self> {
        let http = Client::builder().timeout(SCROBBLE_TIMEOUT).build()?;
        Ok(Self {
            http,
            config,
            api_url: LASTFM_API_URL.to_string(),
        })
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    fn track_params(listen: &Listen) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        params.insert("artist".to_string(), listen.artist.clone());
        params.insert("track".to_string(), listen.title.clone());
        if let Some(album) = &listen.album {
            params.insert("album".to_string(), album.clone());
        }
        if let Some(album_artist) = &listen.album_artist {
            params.insert("albumArtist".to_string(), album_artist.clone());
        }
        if let Some(number) = listen.track_number {
            params.insert("trackNumber".to_string(), number.to_string());
        }
        if listen.duration > 0.0 {
            params.insert("duration".to_string(), (listen.duration.round() as u64).to_string());
        }
        params
    }

    async fn call(&self, method: &str, mut params: BTreeMap<String, String>) -> Result<()> {
        if self.config.session_key.is_empty() {
            return Err(SyncError::NotConfigured(SERVICE));
        }
        params.insert("method".to_string(), method.to_string());
        params.insert("api_key".to_string(), self.config.api_key.clone());
        params.insert("sk".to_string(), self.config.session_key.clone());
        let signature = api_signature(&params, &self.config.api_secret);
        params.insert("api_sig".to_string(), signature);
        params.insert("format".to_string(), "json".to_string());

        let response = self.http.post(&self.api_url).form(&params).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if let Ok(err) = serde_json::from_str::<ApiError>(&body) {
            return Err(SyncError::Service {
                service: SERVICE,
                code: err.error,
                message: err.message,
            });
        }
        if !status.is_success() {
            return Err(SyncError::Http {
                service: SERVICE,
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ScrobbleService for LastfmClient {
    fn name(&self) -> &'static str {
        SERVICE
    }

    async fn now_playing(&self, listen: &Listen) -> Result<()> {
        self.call("track.updateNowPlaying", Self::track_params(listen))
            .await
    }

    async fn scrobble(&self, listen: &Listen) -> Result<()> {
        let mut params = Self::track_params(listen);
        params.insert("timestamp".to_string(), listen.started_at.timestamp().to_string());
        self.call("track.scrobble", params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_sorts_keys_and_skips_format() {
        let mut params = BTreeMap::new();
        params.insert("track".to_string(), "T".to_string());
        params.insert("artist".to_string(), "A".to_string());
        params.insert("format".to_string(), "json".to_string());

        assert_eq!(api_signature(&params, "secret"), md5_hex("artistAtrackTsecret"));
    }
}
