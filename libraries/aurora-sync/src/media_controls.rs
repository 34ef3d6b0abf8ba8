//! Desktop media controls (MPRIS-style)
//!
//! Outbound, state updates become [`MediaControlChange`]s for a
//! [`MediaControlSurface`]. Inbound, [`MediaControlCommand`]s from the desktop
//! map onto playback commands. Times cross this boundary in microseconds.

use crate::error::Result;
use crate::hub::StateConsumer;
use async_trait::async_trait;
use aurora_core::{PlaybackCommand, PlaybackStatus, RepeatMode, StateUpdate, Track};
use serde::{Deserialize, Serialize};

/// Object path reported when nothing is loaded
pub const NO_TRACK: &str = "/org/mpris/MediaPlayer2/TrackList/NoTrack";
const TRACK_PATH_PREFIX: &str = "/org/aurora/track/";

/// Seconds to whole microseconds; invalid or negative input is 0
pub fn to_micros(seconds: f64) -> i64 {
    if seconds.is_finite() && seconds > 0.0 {
        (seconds * 1_000_000.0).round() as i64
    } else {
        0
    }
}

pub fn from_micros(micros: i64) -> f64 {
    micros as f64 / 1_000_000.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaStatus {
    Playing,
    Paused,
    Stopped,
}

impl MediaStatus {
    /// Loading has no desktop equivalent and maps to `None`
    pub fn from_playback(status: PlaybackStatus) -> Option<Self> {
        match status {
            PlaybackStatus::Playing => Some(Self::Playing),
            PlaybackStatus::Paused => Some(Self::Paused),
            PlaybackStatus::Stopped => Some(Self::Stopped),
            PlaybackStatus::Loading => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Playing => "Playing",
            Self::Paused => "Paused",
            Self::Stopped => "Stopped",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopStatus {
    None,
    Playlist,
    Track,
}

impl From<RepeatMode> for LoopStatus {
    fn from(mode: RepeatMode) -> Self {
        match mode {
            RepeatMode::Off => Self::None,
            RepeatMode::All => Self::Playlist,
            RepeatMode::One => Self::Track,
        }
    }
}

impl From<LoopStatus> for RepeatMode {
    fn from(status: LoopStatus) -> Self {
        match status {
            LoopStatus::None => Self::Off,
            LoopStatus::Playlist => Self::All,
            LoopStatus::Track => Self::One,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaMetadata {
    pub track_id: String,
    pub title: String,
    pub artists: Vec<String>,
    pub album: String,
    pub art_url: Option<String>,
    pub length_us: i64,
}

impl MediaMetadata {
    pub fn from_track(track: &Track) -> Self {
        let object_id: String = track
            .id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        let art_url = track.cover_art.as_ref().map(|art| {
            if art.starts_with("http://") || art.starts_with("https://") {
                art.clone()
            } else {
                format!("file://{art}")
            }
        });

        Self {
            track_id: format!("{TRACK_PATH_PREFIX}{object_id}"),
            title: track.title.clone(),
            artists: vec![track.artist.clone()],
            album: track.album.clone(),
            art_url,
            length_us: to_micros(track.duration),
        }
    }
}

/// One property change for the desktop surface
#[derive(Debug, Clone, PartialEq)]
pub enum MediaControlChange {
    /// `None` clears the metadata
    Metadata(Option<MediaMetadata>),
    Status(MediaStatus),
    /// Periodic position, microseconds; no signal
    Position(i64),
    /// Explicit seek, microseconds; emits the seeked signal
    Seeked(i64),
    /// 0.0 while muted
    Volume(f64),
    LoopStatus(LoopStatus),
    Shuffle(bool),
}

/// Translate a state update into a surface change, if it has one
pub fn media_change(update: &StateUpdate) -> Option<MediaControlChange> {
    let change = match update {
        StateUpdate::TrackChanged { track, .. } => {
            MediaControlChange::Metadata(Some(MediaMetadata::from_track(track)))
        }
        StateUpdate::TrackCleared => MediaControlChange::Metadata(None),
        StateUpdate::StatusChanged { status } => {
            MediaControlChange::Status(MediaStatus::from_playback(*status)?)
        }
        StateUpdate::Position { current_time, .. } => {
            MediaControlChange::Position(to_micros(*current_time))
        }
        StateUpdate::Seeked { position } => MediaControlChange::Seeked(to_micros(*position)),
        StateUpdate::Volume { volume, muted } => {
            MediaControlChange::Volume(if *muted { 0.0 } else { *volume })
        }
        StateUpdate::Shuffle { enabled } => MediaControlChange::Shuffle(*enabled),
        StateUpdate::Repeat { mode } => MediaControlChange::LoopStatus((*mode).into()),
        _ => return None,
    };
    Some(change)
}

/// Desktop media-control collaborator
#[async_trait]
pub trait MediaControlSurface: Send {
    async fn apply(&mut self, change: MediaControlChange) -> Result<()>;
}

pub struct MediaControlConsumer {
    surface: Box<dyn MediaControlSurface>,
}

impl MediaControlConsumer {
    pub fn new(surface: Box<dyn MediaControlSurface>) -> Self {
        Self { surface }
    }
}

#[async_trait]
impl StateConsumer for MediaControlConsumer {
    fn name(&self) -> &str {
        "media-controls"
    }

    async fn handle(&mut self, update: &StateUpdate) -> Result<()> {
        match media_change(update) {
            Some(change) => self.surface.apply(change).await,
            None => Ok(()),
        }
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.surface.apply(MediaControlChange::Metadata(None)).await?;
        self.surface
            .apply(MediaControlChange::Status(MediaStatus::Stopped))
            .await
    }
}

/// Control request coming from the desktop
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum MediaControlCommand {
    Play,
    Pause,
    PlayPause,
    Next,
    Previous,
    Stop,
    /// Relative seek in microseconds
    #[serde(rename_all = "camelCase")]
    Seek { offset_us: i64 },
    /// Absolute position in microseconds
    #[serde(rename_all = "camelCase")]
    SetPosition { position_us: i64 },
    Volume { volume: f64 },
    Loop { status: LoopStatus },
    Shuffle { enabled: bool },
}

impl From<MediaControlCommand> for PlaybackCommand {
    fn from(command: MediaControlCommand) -> Self {
        match command {
            MediaControlCommand::Play => Self::Play,
            MediaControlCommand::Pause => Self::Pause,
            MediaControlCommand::PlayPause => Self::TogglePlay,
            MediaControlCommand::Next => Self::Next,
            MediaControlCommand::Previous => Self::Previous,
            MediaControlCommand::Stop => Self::Stop,
            MediaControlCommand::Seek { offset_us } => Self::SeekBy {
                offset: from_micros(offset_us),
            },
            MediaControlCommand::SetPosition { position_us } => Self::Seek {
                position: from_micros(position_us),
            },
            MediaControlCommand::Volume { volume } => Self::SetVolume {
                volume: volume.clamp(0.0, 1.0),
            },
            MediaControlCommand::Loop { status } => Self::SetRepeat {
                mode: status.into(),
            },
            MediaControlCommand::Shuffle { enabled } => Self::SetShuffle { enabled },
        }
    }
}
