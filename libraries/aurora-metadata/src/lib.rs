//! Aurora Player Metadata
//!
//! Tag extraction and directory scanning.
//!
//! This crate provides:
//! - [`MetadataExtractor`]: reads tags with lofty and normalizes them into a
//!   [`Track`](aurora_core::Track); never fails the caller
//! - [`CoverArtCache`]: content-addressed store for embedded cover images
//! - [`DirectoryScanner`]: recursive discovery plus batched extraction with
//!   progress reporting
//! - [`read_audio_details`]: stream properties for the credits view
//!
//! # Example
//!
//! ```rust,no_run
//! use aurora_metadata::{CoverArtCache, DirectoryScanner, MetadataExtractor};
//! use std::path::Path;
//! use std::sync::Arc;
//! # async fn example() {
//! let extractor = Arc::new(MetadataExtractor::new(CoverArtCache::new("/tmp/covers")));
//! let scanner = DirectoryScanner::new(extractor);
//! let tracks = scanner.scan(Path::new("/music"), None).await;
//! println!("found {} tracks", tracks.len());
//! # }
//! ```

mod cover_cache;
mod error;
mod extractor;
mod properties;
mod scanner;

pub use cover_cache::CoverArtCache;
pub use error::{MetadataError, Result};
pub use extractor::MetadataExtractor;
pub use properties::{read_audio_details, AudioDetails};
pub use scanner::{discover_audio_files, is_audio_file, DirectoryScanner, AUDIO_EXTENSIONS, DEFAULT_BATCH_SIZE};
