/// Content-addressed cover art storage
use crate::error::Result;
use aurora_core::content_id;
use std::path::{Path, PathBuf};

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Directory of cover images named `<hash(key)>.<png|jpg>`
#[derive(Debug, Clone)]
pub struct CoverArtCache {
    dir: PathBuf,
}

impl CoverArtCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path an image for `key` would be stored at
    pub fn path_for(&self, key: &str, data: &[u8]) -> PathBuf {
        let ext = if data.starts_with(PNG_SIGNATURE) {
            "png"
        } else {
            "jpg"
        };
        self.dir.join(format!("{}.{ext}", content_id(key)))
    }

    /// Store `data` under `key` unless a file for it already exists
    ///
    /// Returns the cached path either way. Re-scans therefore never rewrite
    /// cover files.
    pub fn store(&self, key: &str, data: &[u8]) -> Result<PathBuf> {
        let path = self.path_for(key, data);
        if path.exists() {
            return Ok(path);
        }
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(&path, data)?;
        Ok(path)
    }

    /// Number of cached images
    pub fn file_count(&self) -> usize {
        std::fs::read_dir(&self.dir)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .filter(|e| e.path().is_file())
                    .count()
            })
            .unwrap_or(0)
    }
}
