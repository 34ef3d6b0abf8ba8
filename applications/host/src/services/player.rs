//! Player service
//!
//! Owns the playback core and the sync hub. The UI's audio element is the
//! pipeline: commands for it queue up in a [`CommandBuffer`] and are handed
//! back on the next IPC round trip, while pipeline events flow in through
//! [`PlayerService::handle_event`]. Every state update the core produces is
//! published to the hub as soon as the call that caused it returns.

use crate::services::media_server;
use aurora_core::{PipelineCommand, PipelineEvent, PlaybackCommand, Track, TrackSource};
use aurora_playback::{
    CommandBuffer, PlaybackConfig, PlaybackCore, PlaybackError, PlaybackSnapshot, SourceResolver,
};
use aurora_subsonic::SubsonicClient;
use aurora_sync::SyncHub;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// How often the error grace window is checked
pub const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Turns tracks into URLs the UI's audio element can load
pub struct HostResolver {
    base_url: String,
    subsonic: Arc<SubsonicClient>,
}

impl HostResolver {
    /// `base_url` is where the `/media` routes are served
    pub fn new(base_url: impl Into<String>, subsonic: Arc<SubsonicClient>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            subsonic,
        }
    }
}

impl SourceResolver for HostResolver {
    fn resolve(&self, track: &Track) -> aurora_playback::Result<String> {
        let unresolvable = |reason: String| PlaybackError::Unresolvable {
            path: track.path.clone(),
            reason,
        };

        match track.source {
            TrackSource::Local => media_server::encode_path(Path::new(&track.path))
                .map(|encoded| format!("{}/media{}", self.base_url, encoded))
                .ok_or_else(|| unresolvable("not an absolute path".to_string())),
            TrackSource::Subsonic => self
                .subsonic
                .stream_url_for_path(&track.path)
                .map_err(|e| unresolvable(e.to_string())),
        }
    }
}

pub struct PlayerService {
    core: Mutex<PlaybackCore<CommandBuffer>>,
    hub: Mutex<Option<SyncHub>>,
}

impl PlayerService {
    pub fn new(config: PlaybackConfig, resolver: Box<dyn SourceResolver>, hub: SyncHub) -> Self {
        Self {
            core: Mutex::new(PlaybackCore::new(config, CommandBuffer::new(), resolver)),
            hub: Mutex::new(Some(hub)),
        }
    }

    /// Run `f` against the core, then fan out whatever it changed
    fn with_core<R>(&self, f: impl FnOnce(&mut PlaybackCore<CommandBuffer>) -> R) -> R {
        let (result, updates) = {
            let mut core = self.core.lock().unwrap_or_else(PoisonError::into_inner);
            let result = f(&mut core);
            (result, core.drain_updates())
        };

        if !updates.is_empty() {
            let hub = self.hub.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(hub) = hub.as_ref() {
                hub.publish_all(&updates);
            }
        }
        result
    }

    /// Apply a command; returns the pipeline commands now pending
    pub fn apply(&self, command: PlaybackCommand) -> aurora_playback::Result<Vec<PipelineCommand>> {
        self.with_core(|core| {
            let result = core.apply(command);
            let commands = core.pipeline_mut().drain();
            result.map(|()| commands)
        })
    }

    /// Feed a pipeline event; returns the pipeline commands now pending
    pub fn handle_event(&self, event: PipelineEvent) -> Vec<PipelineCommand> {
        self.with_core(|core| {
            core.handle_event(event);
            core.pipeline_mut().drain()
        })
    }

    /// Pipeline commands queued since the last round trip
    pub fn poll(&self) -> Vec<PipelineCommand> {
        self.with_core(|core| core.pipeline_mut().drain())
    }

    pub fn tick(&self) {
        self.with_core(|core| core.tick(Instant::now()));
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.with_core(|core| core.snapshot())
    }

    /// Drive auto-skip from a background task
    pub fn spawn_ticker(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let player = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                player.tick();
            }
        })
    }

    /// Stop fan-out and let every consumer drain
    pub async fn shutdown(&self) {
        let hub = self.hub.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(hub) = hub {
            hub.shutdown().await;
        }
    }
}
