//! ListenBrainz scrobbling (`submit-listens`)

use super::{Listen, ScrobbleService, SCROBBLE_TIMEOUT};
use crate::error::{Result, SyncError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

pub const LISTENBRAINZ_API_URL: &str = "https://api.listenbrainz.org";

const SERVICE: &str = "ListenBrainz";
const PLAYER_NAME: &str = "Aurora Player";

#[derive(Debug, Serialize)]
struct Submission<'a> {
    listen_type: &'static str,
    payload: [Payload<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Payload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    listened_at: Option<i64>,
    track_metadata: TrackMetadata<'a>,
}

#[derive(Debug, Serialize)]
struct TrackMetadata<'a> {
    artist_name: &'a str,
    track_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    release_name: Option<&'a str>,
    additional_info: AdditionalInfo,
}

#[derive(Debug, Serialize)]
struct AdditionalInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tracknumber: Option<u32>,
    media_player: &'static str,
    submission_client: &'static str,
    submission_client_version: &'static str,
}

pub struct ListenBrainzClient {
    http: Client,
    token: String,
    api_url: String,
}

impl ListenBrainzClient {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let http = Client::builder().timeout(SCROBBLE_TIMEOUT).build()?;
        Ok(Self {
            http,
            token: token.into(),
            api_url: LISTENBRAINZ_API_URL.to_string(),
        })
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    async fn submit(&self, listen_type: &'static str, listen: &Listen, listened_at: Option<i64>) -> Result<()> {
        if self.token.is_empty() {
            return Err(SyncError::NotConfigured(SERVICE));
        }

        let body = Submission {
            listen_type,
            payload: [Payload {
                listened_at,
                track_metadata: TrackMetadata {
                    artist_name: &listen.artist,
                    track_name: &listen.title,
                    release_name: listen.album.as_deref(),
                    additional_info: AdditionalInfo {
                        duration_ms: (listen.duration > 0.0)
                            .then(|| (listen.duration * 1000.0).round() as u64),
                        tracknumber: listen.track_number,
                        media_player: PLAYER_NAME,
                        submission_client: PLAYER_NAME,
                        submission_client_version: env!("CARGO_PKG_VERSION"),
                    },
                },
            }],
        };

        let response = self
            .http
            .post(format!("{}/1/submit-listens", self.api_url.trim_end_matches('/')))
            .header("Authorization", format!("Token {}", self.token))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SyncError::Http {
                service: SERVICE,
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ScrobbleService for ListenBrainzClient {
    fn name(&self) -> &'static str {
        SERVICE
    }

    async fn now_playing(&self, listen: &Listen) -> Result<()> {
        self.submit("playing_now", listen, None).await
    }

    async fn scrobble(&self, listen: &Listen) -> Result<()> {
        self.submit("single", listen, Some(listen.started_at.timestamp()))
            .await
    }
}
