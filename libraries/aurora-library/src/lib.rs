//! Aurora Player Library
//!
//! The library cache is the system of record for every known folder and
//! track. It is an explicitly constructed service: build it with
//! [`LibraryCache::init`], hand clones to whoever needs it, and call
//! [`LibraryCache::teardown`] before the process exits so the last changes
//! reach disk.
//!
//! Derived album and artist projections are rebuilt from scratch after every
//! mutation ([`LibraryIndex::build`]), so lookups are always consistent with
//! the track list the moment a mutating call returns.
//!
//! # Example
//!
//! ```rust,no_run
//! use aurora_library::{LibraryCache, LibraryConfig};
//! # async fn example() {
//! let cache = LibraryCache::init(LibraryConfig::new("/home/me/.aurora")).await;
//! cache.scan_folder("/home/me/Music", None).await;
//! println!("{} albums", cache.albums().len());
//! cache.teardown().await;
//! # }
//! ```

mod cache;
mod error;
mod index;
mod query;

pub use cache::{
    is_within_folder, LibraryCache, LibraryConfig, LibrarySnapshot, LibraryStats, COVER_CACHE_DIR,
    DEFAULT_FLUSH_DEBOUNCE, LIBRARY_FILE,
};
pub use error::{LibraryError, Result};
pub use index::LibraryIndex;
pub use query::{fold_for_search, AlbumSortOrder, TrackSortOrder};
