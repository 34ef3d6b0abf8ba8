//! Aurora Player Storage
//!
//! File-backed JSON document stores. Every store is loaded once with a
//! tolerant reader (a missing or corrupt file yields the empty document) and
//! rewritten atomically after each mutating operation.
//!
//! - [`PlaylistStore`]: explicit and smart playlists (`playlists.json`)
//! - [`FavoritesStore`]: favorite track ids (`favorites.json`)
//! - [`SettingsStore`]: flat settings document, merge-on-write (`settings.json`)
//! - [`json_file`]: the shared read/write helpers, also used for the library file

pub mod error;
pub mod favorites;
pub mod json_file;
pub mod playlists;
pub mod settings;

pub use error::{Result, StorageError};
pub use favorites::FavoritesStore;
pub use playlists::PlaylistStore;
pub use settings::SettingsStore;

/// Playlist store file name inside the data directory
pub const PLAYLISTS_FILE: &str = "playlists.json";
/// Favorites store file name inside the data directory
pub const FAVORITES_FILE: &str = "favorites.json";
/// Settings file name inside the data directory
pub const SETTINGS_FILE: &str = "settings.json";
