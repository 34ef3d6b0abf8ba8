/// Shared application state
use crate::config::HostConfig;
use crate::error::Result;
use crate::services::player::{HostResolver, PlayerService};
use aurora_core::settings::SETTING_SCROBBLE_ENABLED;
use aurora_core::ScanProgress;
use aurora_enrichment::{Enrichment, EnrichmentConfig};
use aurora_library::LibraryCache;
use aurora_playback::PlaybackConfig;
use aurora_storage::{
    FavoritesStore, PlaylistStore, SettingsStore, FAVORITES_FILE, PLAYLISTS_FILE, SETTINGS_FILE,
};
use aurora_subsonic::SubsonicClient;
use aurora_sync::{
    LastfmClient, ListenBrainzClient, ScrobbleConsumer, SettingsConsumer, SyncHub,
};
use std::sync::{Arc, Mutex, PoisonError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub library: LibraryCache,
    pub playlists: Arc<PlaylistStore>,
    pub favorites: Arc<FavoritesStore>,
    pub settings: Arc<SettingsStore>,
    pub subsonic: Arc<SubsonicClient>,
    pub player: Arc<PlayerService>,
    /// `None` when lookups are switched off
    pub enrichment: Option<Arc<Enrichment>>,
    scan_progress: Arc<Mutex<Option<ScanProgress>>>,
}

impl AppState {
    /// Open every store under the data directory and wire the player
    pub async fn init(config: &HostConfig) -> Result<Self> {
        let data_dir = &config.storage.data_dir;
        tokio::fs::create_dir_all(data_dir).await?;

        let settings = Arc::new(SettingsStore::open(data_dir.join(SETTINGS_FILE)).await);
        let playlists = Arc::new(PlaylistStore::open(data_dir.join(PLAYLISTS_FILE)).await);
        let favorites = Arc::new(FavoritesStore::open(data_dir.join(FAVORITES_FILE)).await);
        let library = LibraryCache::init(config.library_config()).await;

        let subsonic = Arc::new(SubsonicClient::new()?);
        if let Some(remote) = config.subsonic.to_config() {
            subsonic.configure(remote)?;
            tracing::info!("Remote library configured");
        }

        let enrichment = if config.enrichment.enabled {
            let enrichment_config = EnrichmentConfig {
                user_agent: config.enrichment.user_agent.clone(),
                ..Default::default()
            };
            Some(Arc::new(Enrichment::new(&enrichment_config)?))
        } else {
            None
        };

        let stored = settings.get().await;
        let mut hub = SyncHub::new();
        hub.register(SettingsConsumer::new(Arc::clone(&settings)));

        if stored.get_bool(SETTING_SCROBBLE_ENABLED) != Some(false) {
            if let Some(lastfm) = config.scrobble.lastfm.to_config() {
                hub.register(ScrobbleConsumer::new(LastfmClient::new(lastfm)?));
            }
            let token = &config.scrobble.listenbrainz.token;
            if !token.is_empty() {
                hub.register(ScrobbleConsumer::new(ListenBrainzClient::new(token.clone())?));
            }
        }
        tracing::info!(consumers = ?hub.consumer_names(), "State sync ready");

        let resolver = HostResolver::new(config.public_base_url(), Arc::clone(&subsonic));
        let player = Arc::new(PlayerService::new(
            PlaybackConfig::from_settings(&stored),
            Box::new(resolver),
            hub,
        ));

        Ok(Self {
            library,
            playlists,
            favorites,
            settings,
            subsonic,
            player,
            enrichment,
            scan_progress: Arc::new(Mutex::new(None)),
        })
    }

    pub fn record_scan_progress(&self, progress: ScanProgress) {
        *self
            .scan_progress
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(progress);
    }

    /// Progress of the most recent scan
    pub fn scan_progress(&self) -> Option<ScanProgress> {
        *self
            .scan_progress
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Drain sync consumers and flush the library
    pub async fn shutdown(&self) {
        self.player.shutdown().await;
        self.library.teardown().await;
        tracing::info!("Shutdown complete");
    }
}
