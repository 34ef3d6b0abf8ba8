//! Shared HTTP plumbing: timeouts, rate limiting and bounded retry

use crate::error::{EnrichmentError, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};
use url::Url;

/// Default request timeout for every enrichment call
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Attempts per request, including the first
pub const MAX_ATTEMPTS: u32 = 3;
/// Delay before the first retry; doubles per attempt
pub const RETRY_BACKOFF: Duration = Duration::from_millis(500);
/// Minimum spacing between MusicBrainz requests
pub const MUSICBRAINZ_INTERVAL: Duration = Duration::from_secs(1);

/// Settings shared by every enrichment client
#[derive(Debug, Clone)]
pub struct EnrichmentConfig {
    pub user_agent: String,
    pub timeout: Duration,
    pub max_attempts: u32,
    pub retry_backoff: Duration,
    pub musicbrainz_interval: Duration,
    pub art_cache_size: usize,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("AuroraPlayer/{}", env!("CARGO_PKG_VERSION")),
            timeout: REQUEST_TIMEOUT,
            max_attempts: MAX_ATTEMPTS,
            retry_backoff: RETRY_BACKOFF,
            musicbrainz_interval: MUSICBRAINZ_INTERVAL,
            art_cache_size: 256,
        }
    }
}

/// Serializes requests with a minimum interval between them
pub struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval,
        }
    }

    /// Wait until the next request may go out
    pub async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                debug!("Rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// JSON GET client with optional rate limiting and retry on transient failures
pub struct HttpFetcher {
    client: Client,
    limiter: Option<RateLimiter>,
    max_attempts: u32,
    backoff: Duration,
}

impl HttpFetcher {
    pub fn new(config: &EnrichmentConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            limiter: None,
            max_attempts: config.max_attempts.max(1),
            backoff: config.retry_backoff,
        })
    }

    /// Space requests at least `min_interval` apart
    pub fn rate_limited(mut self, min_interval: Duration) -> Self {
        self.limiter = Some(RateLimiter::new(min_interval));
        self
    }

    /// GET `url` and decode JSON; `Ok(None)` on 404
    ///
    /// Transient failures are retried with exponential backoff up to the
    /// attempt limit. Client errors fail immediately.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<Option<T>> {
        let mut attempt = 1;
        loop {
            if let Some(limiter) = &self.limiter {
                limiter.wait().await;
            }

            match self.get_once(url).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    let delay = self.backoff * 2u32.pow(attempt - 1);
                    warn!(url = %url, attempt, error = %e, "Transient failure, retrying in {:?}", delay);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn get_once<T: DeserializeOwned>(&self, url: &Url) -> Result<Option<T>> {
        debug!(url = %url, "Enrichment request");
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EnrichmentError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| EnrichmentError::Parse(e.to_string()))
    }
}

/// Join `path` onto a base URL and append query pairs
pub(crate) fn build_url(base: &str, path: &str, query: &[(&str, &str)]) -> Result<Url> {
    let mut url = Url::parse(&format!("{}{}", base.trim_end_matches('/'), path))
        .map_err(|e| EnrichmentError::InvalidUrl(e.to_string()))?;
    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in query {
            pairs.append_pair(key, value);
        }
    }
    Ok(url)
}
