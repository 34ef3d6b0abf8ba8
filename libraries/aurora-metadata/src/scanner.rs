/// Directory scanning
use crate::extractor::MetadataExtractor;
use aurora_core::{ScanProgress, Track};
use futures::future::join_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use walkdir::WalkDir;

/// Supported audio file extensions (lowercase, without the dot)
pub const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "flac", "ogg", "opus", "wav", "m4a", "aac", "wma", "alac",
];

/// Files extracted concurrently per batch
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Check if a file has a supported audio extension (case-insensitive)
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| AUDIO_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Recursively collect audio files under `root`, depth-first
///
/// Unreadable directories are logged and skipped; their siblings are still
/// walked.
pub fn discover_audio_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file() && is_audio_file(entry.path()) {
                    files.push(entry.into_path());
                }
            }
            Err(e) => {
                let at = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                warn!(path = %at, error = %e, "Skipping unreadable entry");
            }
        }
    }

    files
}

/// Walks a folder tree and feeds every audio file through the extractor
pub struct DirectoryScanner {
    extractor: Arc<MetadataExtractor>,
    batch_size: usize,
}

impl DirectoryScanner {
    pub fn new(extractor: Arc<MetadataExtractor>) -> Self {
        Self {
            extractor,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Override the batch size (minimum 1)
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Scan `root` and return one track per discovered audio file
    ///
    /// Files are processed in fixed-size batches: every file of a batch is
    /// extracted concurrently on the blocking pool, batches run one after
    /// another, and a progress event is sent after each batch.
    pub async fn scan(
        &self,
        root: &Path,
        progress_tx: Option<mpsc::Sender<ScanProgress>>,
    ) -> Vec<Track> {
        let walk_root = root.to_path_buf();
        let files = match tokio::task::spawn_blocking(move || discover_audio_files(&walk_root)).await
        {
            Ok(files) => files,
            Err(e) => {
                warn!(root = %root.display(), error = %e, "Discovery task failed");
                Vec::new()
            }
        };

        let total = files.len();
        info!(root = %root.display(), total, "Scanning folder");

        let mut tracks = Vec::with_capacity(total);
        for (batch_index, batch) in files.chunks(self.batch_size).enumerate() {
            let handles = batch.iter().cloned().map(|path| {
                let extractor = Arc::clone(&self.extractor);
                tokio::task::spawn_blocking(move || extractor.extract(&path))
            });

            for (path, result) in batch.iter().zip(join_all(handles).await) {
                match result {
                    Ok(track) => tracks.push(track),
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Extraction task failed");
                        let stem = path
                            .file_stem()
                            .map(|s| s.to_string_lossy().into_owned())
                            .unwrap_or_default();
                        tracks.push(Track::degraded(&path.to_string_lossy(), &stem));
                    }
                }
            }

            if let Some(ref tx) = progress_tx {
                let current = ((batch_index + 1) * self.batch_size).min(total);
                let _ = tx.send(ScanProgress { current, total }).await;
            }
        }

        info!(root = %root.display(), tracks = tracks.len(), "Scan finished");
        tracks
    }
}
