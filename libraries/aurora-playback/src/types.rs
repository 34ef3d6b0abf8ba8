//! Core types for playback management

use aurora_core::settings::{
    DEFAULT_VOLUME, SETTING_MUTED, SETTING_REPEAT_MODE, SETTING_SHUFFLE, SETTING_VOLUME,
};
use aurora_core::{PlaybackErrorKind, PlaybackStatus, RepeatMode, Settings, Track};
use serde::Serialize;
use std::time::Duration;

/// Elapsed time after which `previous()` restarts the track instead
pub const RESTART_THRESHOLD: Duration = Duration::from_secs(3);

/// How long an error stays visible before auto-skip
pub const ERROR_GRACE: Duration = Duration::from_secs(3);

/// Playback configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackConfig {
    /// Initial volume (0.0 - 1.0)
    pub volume: f64,
    pub muted: bool,
    pub shuffle: bool,
    pub repeat: RepeatMode,
    pub restart_threshold: Duration,
    pub error_grace: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            volume: DEFAULT_VOLUME,
            muted: false,
            shuffle: false,
            repeat: RepeatMode::Off,
            restart_threshold: RESTART_THRESHOLD,
            error_grace: ERROR_GRACE,
        }
    }
}

impl PlaybackConfig {
    /// Restore persisted playback preferences, ignoring malformed values
    pub fn from_settings(settings: &Settings) -> Self {
        let defaults = Self::default();
        Self {
            volume: settings
                .get_f64(SETTING_VOLUME)
                .filter(|v| v.is_finite())
                .map_or(defaults.volume, |v| v.clamp(0.0, 1.0)),
            muted: settings.get_bool(SETTING_MUTED).unwrap_or(false),
            shuffle: settings.get_bool(SETTING_SHUFFLE).unwrap_or(false),
            repeat: settings
                .get_str(SETTING_REPEAT_MODE)
                .and_then(RepeatMode::from_str)
                .unwrap_or_default(),
            ..defaults
        }
    }
}

/// Error currently surfaced to the user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackFault {
    pub kind: PlaybackErrorKind,
    pub message: String,
}

/// Complete view of the player for UIs attaching late
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSnapshot {
    pub current_track: Option<Track>,
    pub current_index: Option<usize>,
    pub queue: Vec<Track>,
    pub status: PlaybackStatus,
    pub current_time: f64,
    pub duration: f64,
    /// Percentage of the track played
    pub progress: f64,
    pub volume: f64,
    pub muted: bool,
    pub shuffle: bool,
    pub repeat: RepeatMode,
    pub has_next: bool,
    pub has_previous: bool,
    pub error: Option<PlaybackFault>,
}
