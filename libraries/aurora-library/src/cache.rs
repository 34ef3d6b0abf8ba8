//! Library cache service

use crate::error::{LibraryError, Result};
use crate::index::LibraryIndex;
use crate::query::{self, AlbumSortOrder, TrackSortOrder};
use aurora_core::types::{Album, Artist, Track, TrackSource};
use aurora_core::ScanProgress;
use aurora_metadata::{CoverArtCache, DirectoryScanner, MetadataExtractor, DEFAULT_BATCH_SIZE};
use aurora_storage::json_file::{read_or_default, write_atomic};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Library file name inside the data directory
pub const LIBRARY_FILE: &str = "library.json";
/// Cover-art cache directory name inside the data directory
pub const COVER_CACHE_DIR: &str = "cover-cache";
/// Default delay between a mutation and the write it triggers
pub const DEFAULT_FLUSH_DEBOUNCE: Duration = Duration::from_secs(2);

/// Library cache configuration
#[derive(Debug, Clone)]
pub struct LibraryConfig {
    /// Directory holding `library.json` and `cover-cache/`
    pub data_dir: PathBuf,
    /// Debounce window for persistence
    pub flush_debounce: Duration,
    /// Files extracted concurrently per scan batch
    pub scan_batch_size: usize,
}

impl LibraryConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            flush_debounce: DEFAULT_FLUSH_DEBOUNCE,
            scan_batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn library_file(&self) -> PathBuf {
        self.data_dir.join(LIBRARY_FILE)
    }

    pub fn cover_dir(&self) -> PathBuf {
        self.data_dir.join(COVER_CACHE_DIR)
    }
}

/// Persisted shape of the library: `{folders, tracks}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibrarySnapshot {
    #[serde(default)]
    pub folders: Vec<String>,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

/// Aggregate counts for status displays
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryStats {
    pub folders: usize,
    pub tracks: usize,
    pub albums: usize,
    pub artists: usize,
    pub total_duration: f64,
}

/// Whether `path` lies inside `folder`
///
/// The match is bounded by a path separator, so removing `/music/A` does not
/// touch `/music/AB/song.mp3`.
pub fn is_within_folder(path: &str, folder: &str) -> bool {
    let folder = normalize_folder(folder);
    match path.strip_prefix(folder.as_str()) {
        Some(rest) => {
            rest.is_empty()
                || folder.ends_with(['/', '\\'])
                || rest.starts_with(['/', '\\'])
        }
        None => false,
    }
}

/// Folder path without trailing separators (the filesystem root is kept)
fn normalize_folder(folder: &str) -> String {
    let trimmed = folder.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() {
        folder.chars().take(1).collect()
    } else {
        trimmed.to_string()
    }
}

struct LibraryState {
    folders: Vec<String>,
    tracks: Vec<Track>,
    index: LibraryIndex,
}

impl LibraryState {
    fn from_snapshot(snapshot: LibrarySnapshot) -> Self {
        let mut state = Self {
            folders: snapshot.folders,
            tracks: snapshot.tracks,
            index: LibraryIndex::default(),
        };
        state.rebuild();
        state
    }

    fn rebuild(&mut self) {
        self.index = LibraryIndex::build(&self.tracks);
    }

    fn upsert(&mut self, tracks: Vec<Track>) {
        let mut positions: HashMap<String, usize> = self
            .tracks
            .iter()
            .enumerate()
            .map(|(i, t)| (t.path.clone(), i))
            .collect();

        for track in tracks {
            match positions.get(&track.path) {
                Some(&i) => self.tracks[i] = track,
                None => {
                    positions.insert(track.path.clone(), self.tracks.len());
                    self.tracks.push(track);
                }
            }
        }
    }
}

#[derive(Default)]
struct FlushState {
    dirty: bool,
    timer: Option<JoinHandle<()>>,
}

struct Inner {
    state: RwLock<LibraryState>,
    library_file: PathBuf,
    debounce: Duration,
    flush: Mutex<FlushState>,
    write_lock: tokio::sync::Mutex<()>,
    scanner: DirectoryScanner,
    runtime: Handle,
}

impl Inner {
    fn read(&self) -> RwLockReadGuard<'_, LibraryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, LibraryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn flush_state(&self) -> MutexGuard<'_, FlushState> {
        self.flush.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot(&self) -> LibrarySnapshot {
        let state = self.read();
        LibrarySnapshot {
            folders: state.folders.clone(),
            tracks: state.tracks.clone(),
        }
    }

    async fn persist(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let snapshot = self.snapshot();
        write_atomic(&self.library_file, &snapshot).await?;
        debug!(
            path = %self.library_file.display(),
            tracks = snapshot.tracks.len(),
            "Library flushed"
        );
        Ok(())
    }

    /// Debounce loop: flush once the library has been quiet for one window
    async fn run_flush_timer(self: Arc<Self>) {
        loop {
            tokio::time::sleep(self.debounce).await;
            {
                let mut flush = self.flush_state();
                if !flush.dirty {
                    flush.timer = None;
                    return;
                }
                flush.dirty = false;
            }
            if let Err(e) = self.persist().await {
                error!(error = %e, "Failed to persist library, keeping changes in memory");
            }
        }
    }
}

/// In-memory system of record for folders and tracks
///
/// Cheap to clone; every clone shares the same state.
#[derive(Clone)]
pub struct LibraryCache {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for LibraryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibraryCache")
            .field("library_file", &self.inner.library_file)
            .finish_non_exhaustive()
    }
}

impl LibraryCache {
    /// Load the persisted library and build its indexes
    ///
    /// A missing or corrupt library file yields an empty library.
    pub async fn init(config: LibraryConfig) -> Self {
        let library_file = config.library_file();
        let snapshot: LibrarySnapshot = read_or_default(&library_file).await;
        info!(
            folders = snapshot.folders.len(),
            tracks = snapshot.tracks.len(),
            "Library loaded"
        );

        let extractor = MetadataExtractor::new(CoverArtCache::new(config.cover_dir()));
        let scanner = DirectoryScanner::new(Arc::new(extractor))
            .with_batch_size(config.scan_batch_size);

        Self {
            inner: Arc::new(Inner {
                state: RwLock::new(LibraryState::from_snapshot(snapshot)),
                library_file,
                debounce: config.flush_debounce,
                flush: Mutex::new(FlushState::default()),
                write_lock: tokio::sync::Mutex::new(()),
                scanner,
                runtime: Handle::current(),
            }),
        }
    }

    /// Write pending changes and stop the flush timer
    pub async fn teardown(&self) {
        self.force_flush().await;
        info!("Library cache shut down");
    }

    // ===== Mutations =====

    /// Add `folder` if new and upsert `tracks` by path (last write wins)
    pub fn merge_scan_results(&self, folder: &str, tracks: Vec<Track>) {
        let folder = normalize_folder(folder);
        {
            let mut state = self.inner.write();
            if !state.folders.contains(&folder) {
                state.folders.push(folder);
            }
            state.upsert(tracks);
            state.rebuild();
        }
        self.schedule_flush();
    }

    /// Remove `folder` and every track inside it; returns the removed count
    pub fn remove_folder(&self, folder: &str) -> usize {
        let folder = normalize_folder(folder);
        let removed = {
            let mut state = self.inner.write();
            state.folders.retain(|f| *f != folder);
            let before = state.tracks.len();
            state
                .tracks
                .retain(|t| t.is_remote() || !is_within_folder(&t.path, &folder));
            state.rebuild();
            before - state.tracks.len()
        };
        info!(folder = %folder, removed, "Removed folder from library");
        self.schedule_flush();
        removed
    }

    /// Replace every remote track with `tracks`
    pub fn replace_remote_tracks(&self, tracks: Vec<Track>) {
        {
            let mut state = self.inner.write();
            state.tracks.retain(|t| !t.is_remote());
            state.upsert(
                tracks
                    .into_iter()
                    .filter(|t| t.source == TrackSource::Subsonic)
                    .collect(),
            );
            state.rebuild();
        }
        self.schedule_flush();
    }

    /// Scan `folder` from disk and merge the result; returns the track count
    pub async fn scan_folder(
        &self,
        folder: impl AsRef<Path>,
        progress_tx: Option<mpsc::Sender<ScanProgress>>,
    ) -> usize {
        let folder = folder.as_ref();
        let tracks = self.inner.scanner.scan(folder, progress_tx).await;
        let count = tracks.len();
        self.merge_scan_results(&folder.to_string_lossy(), tracks);
        count
    }

    /// Re-scan every known folder
    pub async fn rescan_all(&self, progress_tx: Option<mpsc::Sender<ScanProgress>>) -> usize {
        let folders = self.folders();
        let mut total = 0;
        for folder in folders {
            total += self.scan_folder(&folder, progress_tx.clone()).await;
        }
        total
    }

    // ===== Persistence =====

    /// Mark the library dirty and make sure a flush timer is running
    pub fn schedule_flush(&self) {
        let mut flush = self.inner.flush_state();
        flush.dirty = true;
        if flush.timer.is_some() {
            return;
        }
        let inner = Arc::clone(&self.inner);
        flush.timer = Some(self.inner.runtime.spawn(inner.run_flush_timer()));
    }

    /// Cancel any pending timer and write the library now
    ///
    /// Errors are logged; the in-memory library stays authoritative.
    pub async fn force_flush(&self) {
        let timer = {
            let mut flush = self.inner.flush_state();
            flush.dirty = false;
            flush.timer.take()
        };
        if let Some(timer) = timer {
            timer.abort();
        }
        if let Err(e) = self.inner.persist().await {
            error!(error = %e, "Failed to persist library, keeping changes in memory");
        }
    }

    // ===== Queries =====

    pub fn folders(&self) -> Vec<String> {
        self.inner.read().folders.clone()
    }

    pub fn tracks(&self) -> Vec<Track> {
        self.inner.read().tracks.clone()
    }

    /// Run `f` against the track list without cloning it
    pub fn with_tracks<R>(&self, f: impl FnOnce(&[Track]) -> R) -> R {
        f(&self.inner.read().tracks)
    }

    pub fn snapshot(&self) -> LibrarySnapshot {
        self.inner.snapshot()
    }

    pub fn track_count(&self) -> usize {
        self.inner.read().tracks.len()
    }

    pub fn track_by_path(&self, path: &str) -> Option<Track> {
        let state = self.inner.read();
        state
            .index
            .position_of_path(path)
            .map(|i| state.tracks[i].clone())
    }

    pub fn track_by_id(&self, id: &str) -> Option<Track> {
        let state = self.inner.read();
        state
            .index
            .position_of_id(id)
            .map(|i| state.tracks[i].clone())
    }

    pub fn albums(&self) -> Vec<Album> {
        self.inner.read().index.albums().to_vec()
    }

    pub fn album_by_id(&self, id: &str) -> Result<Album> {
        self.inner
            .read()
            .index
            .album_by_id(id)
            .cloned()
            .ok_or_else(|| LibraryError::not_found("Album", id))
    }

    /// Tracks of an album in disc/track order
    pub fn album_tracks(&self, id: &str) -> Result<Vec<Track>> {
        let album = self.album_by_id(id)?;
        let mut tracks: Vec<Track> = self.with_tracks(|tracks| {
            tracks
                .iter()
                .filter(|t| t.album == album.name && t.album_artist == album.artist)
                .cloned()
                .collect()
        });
        query::sort_album_tracks(&mut tracks);
        Ok(tracks)
    }

    pub fn artists(&self) -> Vec<Artist> {
        let mut artists = self.inner.read().index.artists().to_vec();
        artists.sort_by_key(|a| query::fold_for_search(&a.name));
        artists
    }

    pub fn search(&self, query_text: &str) -> Vec<Track> {
        self.with_tracks(|tracks| {
            query::search_tracks(tracks, query_text)
                .into_iter()
                .cloned()
                .collect()
        })
    }

    pub fn sorted_tracks(&self, order: TrackSortOrder) -> Vec<Track> {
        let mut tracks = self.tracks();
        query::sort_tracks(&mut tracks, order);
        tracks
    }

    pub fn sorted_albums(&self, order: AlbumSortOrder) -> Vec<Album> {
        let mut albums = self.albums();
        query::sort_albums(&mut albums, order);
        albums
    }

    pub fn stats(&self) -> LibraryStats {
        let state = self.inner.read();
        LibraryStats {
            folders: state.folders.len(),
            tracks: state.tracks.len(),
            albums: state.index.albums().len(),
            artists: state.index.artists().len(),
            total_duration: state.tracks.iter().map(|t| t.duration).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folder_match_is_separator_bounded() {
        assert!(is_within_folder("/music/A/song.mp3", "/music/A"));
        assert!(is_within_folder("/music/A/song.mp3", "/music/A/"));
        assert!(is_within_folder("/music/A/deep/er/x.flac", "/music/A"));
        assert!(!is_within_folder("/music/AB/song.mp3", "/music/A"));
        assert!(!is_within_folder("/music/song.mp3", "/music/A"));
        assert!(is_within_folder("C:\\Music\\x.mp3", "C:\\Music"));
        assert!(is_within_folder("/x.mp3", "/"));
    }

    #[test]
    fn normalize_folder_trims_trailing_separators() {
        assert_eq!(normalize_folder("/music/"), "/music");
        assert_eq!(normalize_folder("/"), "/");
        assert_eq!(normalize_folder("D:\\Music\\"), "D:\\Music");
    }
}
