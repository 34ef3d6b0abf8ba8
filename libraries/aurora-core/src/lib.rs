//! Aurora Player Core
//!
//! Platform-agnostic domain types, content ids and boundary messages shared by
//! every Aurora Player crate.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `Album`, `Artist`, `Playlist`
//! - **Normalization**: one field-default table per entity (`RawTrack::normalize`)
//! - **Boundary Messages**: closed tagged enums for scan, playback and state updates
//! - **Error Handling**: unified `AuroraError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use aurora_core::types::{RawTrack, TrackSource};
//!
//! let track = RawTrack {
//!     title: Some("Intro".into()),
//!     duration: Some(f64::NAN),
//!     ..RawTrack::default()
//! }
//! .normalize("/music/intro.flac", "intro", TrackSource::Local);
//!
//! assert_eq!(track.artist, "Unknown Artist");
//! assert_eq!(track.duration, 0.0);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod ids;
pub mod ipc;
pub mod settings;
pub mod types;

pub use error::{AuroraError, Result};
pub use ids::content_id;
pub use ipc::{
    MediaErrorCode, PipelineCommand, PipelineEvent, PlaybackCommand, ScanProgress, StateUpdate,
};
pub use settings::Settings;
pub use types::{
    Album, Artist, PlaybackErrorKind, PlaybackStatus, Playlist, RawTrack, RepeatMode, RuleField,
    RuleMatch, RuleOperator, RuleValue, SmartRule, Track, TrackCredits, TrackSource,
};
