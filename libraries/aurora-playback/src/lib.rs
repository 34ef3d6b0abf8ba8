//! Aurora Player - Playback Core
//!
//! Pipeline-agnostic playback management.
//!
//! This crate provides:
//! - A play queue with a cursor and a shadow original order
//! - Shuffle around the current track, losslessly reverted
//! - Repeat modes (Off, All, One)
//! - Restart-vs-go-back `previous()`
//! - A status machine driven by audio pipeline events
//! - Error categorization with auto-skip after a grace window
//!
//! # Architecture
//!
//! The core never decodes audio. It talks to the pipeline through two seams:
//! - [`AudioPipeline`] receives [`aurora_core::PipelineCommand`]s
//! - [`SourceResolver`] turns a track into a loadable URL
//!
//! Pipeline events come back in through [`PlaybackCore::handle_event`], and
//! every resulting transition is queued as an [`aurora_core::StateUpdate`] for
//! the owner to fan out.
//!
//! # Example
//!
//! ```rust
//! use aurora_core::{PipelineEvent, PlaybackStatus, RawTrack, Track, TrackSource};
//! use aurora_playback::{CommandBuffer, PlaybackConfig, PlaybackCore, SourceResolver};
//!
//! struct FileUrls;
//!
//! impl SourceResolver for FileUrls {
//!     fn resolve(&self, track: &Track) -> aurora_playback::Result<String> {
//!         Ok(format!("file://{}", track.path))
//!     }
//! }
//!
//! let mut core = PlaybackCore::new(
//!     PlaybackConfig::default(),
//!     CommandBuffer::new(),
//!     Box::new(FileUrls),
//! );
//!
//! let track = RawTrack::default().normalize("/music/a.mp3", "a", TrackSource::Local);
//! core.play_all(vec![track], 0).unwrap();
//! assert_eq!(core.status(), PlaybackStatus::Loading);
//!
//! core.handle_event(PipelineEvent::Playing);
//! assert!(core.is_playing());
//!
//! let commands = core.pipeline_mut().drain();
//! assert!(!commands.is_empty());
//! ```

mod error;
mod pipeline;
mod player;
mod queue;
mod shuffle;
pub mod types;

pub use player::PlaybackCore;
pub use error::{PlaybackError, Result};
pub use pipeline::{AudioPipeline, CommandBuffer, SourceResolver};
pub use queue::{EntryId, PlayQueue, QueueEntry, RemovedEntry};
pub use shuffle::shuffle_keeping_first;
pub use types::{
    PlaybackConfig, PlaybackFault, PlaybackSnapshot, ERROR_GRACE, RESTART_THRESHOLD,
};
