/// Playback state types shared across the boundary
use serde::{Deserialize, Serialize};

/// Repeat mode for playback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    #[default]
    Off,
    All,
    One,
}

impl RepeatMode {
    /// Convert to string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::All => "all",
            Self::One => "one",
        }
    }

    /// Parse from string
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "off" => Some(Self::Off),
            "all" => Some(Self::All),
            "one" => Some(Self::One),
            _ => None,
        }
    }

    /// Next mode in the off → all → one cycle
    #[must_use]
    pub fn cycle(self) -> Self {
        match self {
            Self::Off => Self::All,
            Self::All => Self::One,
            Self::One => Self::Off,
        }
    }

    /// Whether queue ends wrap or the track replays
    pub fn is_active(self) -> bool {
        self != Self::Off
    }
}

impl std::fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Playback status of the single audio pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    /// No track loaded, or the queue ran out
    #[default]
    Stopped,
    /// Waiting for the pipeline to buffer
    Loading,
    Playing,
    Paused,
}

/// Human-readable category of a pipeline failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackErrorKind {
    Aborted,
    Network,
    Decode,
    Unsupported,
    Unknown,
}

impl PlaybackErrorKind {
    /// Message shown to the user while the error is surfaced
    pub fn message(self) -> &'static str {
        match self {
            Self::Aborted => "Playback aborted",
            Self::Network => "Network error while loading track",
            Self::Decode => "Could not decode audio file",
            Self::Unsupported => "Audio format not supported",
            Self::Unknown => "Playback failed",
        }
    }
}
