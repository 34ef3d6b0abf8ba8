//! Boundary messages
//!
//! Every payload that crosses the process boundary between the UI shell and
//! the core is one of these closed, tagged enums. Unknown variants fail to
//! deserialize instead of flowing through as untyped JSON.

use crate::types::{PlaybackErrorKind, PlaybackStatus, RepeatMode, Track};
use serde::{Deserialize, Serialize};

/// Scan progress, emitted after every batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanProgress {
    pub current: usize,
    pub total: usize,
}

/// Command from the UI (or a media-control surface) to the playback core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlaybackCommand {
    PlayAll { tracks: Vec<Track>, start_index: usize },
    AddToQueue { tracks: Vec<Track> },
    PlayNext { track: Track },
    PlayLater { track: Track },
    RemoveFromQueue { index: usize },
    MoveInQueue { from: usize, to: usize },
    PlayFromQueue { index: usize },
    ClearQueue,
    Play,
    Pause,
    TogglePlay,
    Stop,
    Next,
    Previous,
    /// Absolute position in seconds
    Seek { position: f64 },
    /// Relative offset in seconds
    SeekBy { offset: f64 },
    /// Position as a percentage of the duration
    SeekPercent { percent: f64 },
    SetVolume { volume: f64 },
    ToggleMute,
    ToggleShuffle,
    SetShuffle { enabled: bool },
    CycleRepeat,
    SetRepeat { mode: RepeatMode },
}

/// Error code reported by the audio pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaErrorCode {
    Aborted,
    Network,
    Decode,
    SrcNotSupported,
    Unknown,
}

impl MediaErrorCode {
    /// Map a numeric media error code (1-4) to its variant
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => Self::Aborted,
            2 => Self::Network,
            3 => Self::Decode,
            4 => Self::SrcNotSupported,
            _ => Self::Unknown,
        }
    }
}

impl From<MediaErrorCode> for PlaybackErrorKind {
    fn from(code: MediaErrorCode) -> Self {
        match code {
            MediaErrorCode::Aborted => Self::Aborted,
            MediaErrorCode::Network => Self::Network,
            MediaErrorCode::Decode => Self::Decode,
            MediaErrorCode::SrcNotSupported => Self::Unsupported,
            MediaErrorCode::Unknown => Self::Unknown,
        }
    }
}

/// Event reported by the audio pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    Playing,
    Pause,
    Waiting,
    CanPlay,
    Ended,
    Error {
        code: MediaErrorCode,
        #[serde(default)]
        message: Option<String>,
    },
    TimeUpdate { current_time: f64 },
    DurationChange { duration: f64 },
}

/// Instruction from the playback core to the audio pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineCommand {
    Load { url: String },
    Play,
    Pause,
    Seek { position: f64 },
    SetVolume { volume: f64 },
    SetMuted { muted: bool },
    Unload,
}

/// State delta broadcast to every consumer after a transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateUpdate {
    /// A new track was loaded
    TrackChanged { track: Track, index: usize },
    /// Nothing is loaded anymore
    TrackCleared,
    StatusChanged { status: PlaybackStatus },
    /// Periodic position tick
    Position { current_time: f64, duration: f64 },
    /// Explicit jump of the playhead
    Seeked { position: f64 },
    Volume { volume: f64, muted: bool },
    Shuffle { enabled: bool },
    Repeat { mode: RepeatMode },
    QueueChanged { length: usize, current_index: Option<usize> },
    Error { kind: PlaybackErrorKind, message: String },
    ErrorCleared,
}
