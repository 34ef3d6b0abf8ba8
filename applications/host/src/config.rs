/// Host configuration
use crate::error::{HostError, Result};
use aurora_library::LibraryConfig;
use aurora_subsonic::SubsonicConfig;
use aurora_sync::LastfmConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File picked up from the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "aurora.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HostConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub library: LibrarySettings,

    #[serde(default)]
    pub subsonic: SubsonicSettings,

    #[serde(default)]
    pub scrobble: ScrobbleSettings,

    #[serde(default)]
    pub enrichment: EnrichmentSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    /// Holds the library, playlists, favorites, settings and cover cache
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LibrarySettings {
    #[serde(default = "default_flush_debounce_ms")]
    pub flush_debounce_ms: u64,

    #[serde(default = "default_scan_batch_size")]
    pub scan_batch_size: usize,
}

/// An empty `url` leaves the remote library disconnected
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SubsonicSettings {
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    #[serde(default)]
    pub legacy_auth: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ScrobbleSettings {
    #[serde(default)]
    pub lastfm: LastfmSettings,

    #[serde(default)]
    pub listenbrainz: ListenBrainzSettings,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LastfmSettings {
    #[serde(default)]
    pub api_key: String,

    #[serde(default)]
    pub api_secret: String,

    #[serde(default)]
    pub session_key: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ListenBrainzSettings {
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnrichmentSettings {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl HostConfig {
    /// Load configuration from a file and the environment
    ///
    /// An explicit `path` must exist; otherwise `aurora.toml` is read when
    /// present. `AURORA_<SECTION>__<KEY>` variables override both, e.g.
    /// `AURORA_SERVER__PORT=9000`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                settings = settings.add_source(
                    config::File::new(DEFAULT_CONFIG_FILE, config::FileFormat::Toml)
                        .required(false),
                );
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("AURORA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| HostError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| HostError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.library.scan_batch_size == 0 {
            return Err(HostError::Config(
                "library.scan_batch_size must be at least 1".to_string(),
            ));
        }

        if self.subsonic.is_enabled() && self.subsonic.username.is_empty() {
            return Err(HostError::Config(
                "subsonic.username is required when subsonic.url is set".to_string(),
            ));
        }

        Ok(())
    }

    pub fn library_config(&self) -> LibraryConfig {
        LibraryConfig {
            flush_debounce: Duration::from_millis(self.library.flush_debounce_ms),
            scan_batch_size: self.library.scan_batch_size,
            ..LibraryConfig::new(&self.storage.data_dir)
        }
    }

    /// Base URL the media routes are reachable under
    pub fn public_base_url(&self) -> String {
        let host = match self.server.host.as_str() {
            "0.0.0.0" | "::" => "127.0.0.1",
            other => other,
        };
        format!("http://{}:{}", host, self.server.port)
    }
}

impl SubsonicSettings {
    pub fn is_enabled(&self) -> bool {
        !self.url.trim().is_empty()
    }

    pub fn to_config(&self) -> Option<SubsonicConfig> {
        self.is_enabled().then(|| {
            SubsonicConfig::new(&self.url, &self.username, &self.password)
                .with_legacy_auth(self.legacy_auth)
        })
    }
}

impl LastfmSettings {
    /// `None` until a session key has been obtained
    pub fn to_config(&self) -> Option<LastfmConfig> {
        (!self.api_key.is_empty() && !self.session_key.is_empty()).then(|| LastfmConfig {
            api_key: self.api_key.clone(),
            api_secret: self.api_secret.clone(),
            session_key: self.session_key.clone(),
        })
    }
}

// Default values
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    7878
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_flush_debounce_ms() -> u64 {
    aurora_library::DEFAULT_FLUSH_DEBOUNCE.as_millis() as u64
}

fn default_scan_batch_size() -> usize {
    aurora_metadata::DEFAULT_BATCH_SIZE
}

fn default_enabled() -> bool {
    true
}

fn default_user_agent() -> String {
    format!("AuroraPlayer/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            flush_debounce_ms: default_flush_debounce_ms(),
            scan_batch_size: default_scan_batch_size(),
        }
    }
}

impl Default for EnrichmentSettings {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            user_agent: default_user_agent(),
        }
    }
}
