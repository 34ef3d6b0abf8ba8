//! Aurora Player - State Sync
//!
//! Fans playback state updates out to independent consumers:
//! - Desktop media controls ([`MediaControlConsumer`])
//! - Rich presence ([`PresenceConsumer`])
//! - Scrobblers for Last.fm and ListenBrainz ([`ScrobbleConsumer`])
//! - Settings persistence ([`SettingsConsumer`])
//!
//! Every consumer runs in its own task. A failing or slow consumer never
//! touches playback or any other consumer.
//!
//! # Example
//!
//! ```rust,ignore
//! use aurora_sync::{ListenBrainzClient, ScrobbleConsumer, SyncHub};
//!
//! let mut hub = SyncHub::new();
//! hub.register(ScrobbleConsumer::new(ListenBrainzClient::new(token)?));
//!
//! for update in core.drain_updates() {
//!     hub.publish(&update);
//! }
//! hub.shutdown().await;
//! ```

mod error;
mod hub;
pub mod media_controls;
pub mod presence;
pub mod scrobble;
mod settings;

pub use error::{Result, SyncError};
pub use hub::{StateConsumer, SyncHub, DEFAULT_CHANNEL_CAPACITY};
pub use media_controls::{
    media_change, LoopStatus, MediaControlChange, MediaControlCommand, MediaControlConsumer,
    MediaControlSurface, MediaMetadata, MediaStatus,
};
pub use presence::{
    build_presence, ArtworkLookup, Presence, PresenceConsumer, PresenceFormat, PresencePublisher,
};
pub use scrobble::{
    LastfmClient, LastfmConfig, Listen, ListenBrainzClient, ScrobbleConsumer, ScrobbleService,
    ScrobbleSignal, ScrobbleTracker,
};
pub use settings::{settings_patch, SettingsConsumer};
