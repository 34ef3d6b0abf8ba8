//! Settings persistence
//!
//! The settings file is shared with collaborators outside the core, so every
//! write merges into the stored document instead of replacing it.

use crate::error::Result;
use crate::json_file::{read_or_default, write_atomic};
use aurora_core::Settings;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// File-backed settings document
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    document: RwLock<Settings>,
}

impl SettingsStore {
    /// Load settings, filling first-launch defaults for missing keys
    pub async fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let mut document: Settings = read_or_default(&path).await;
        document.fill_missing(&Settings::with_defaults());
        Self {
            path,
            document: RwLock::new(document),
        }
    }

    /// Snapshot of the whole document
    pub async fn get(&self) -> Settings {
        self.document.read().await.clone()
    }

    /// Merge `patch` into the document and persist it
    ///
    /// The in-memory document is left untouched if the write fails.
    pub async fn update(&self, patch: Map<String, Value>) -> Result<Settings> {
        let mut document = self.document.write().await;
        let mut next = document.clone();
        next.merge(patch);
        write_atomic(&self.path, &next).await?;
        *document = next.clone();
        Ok(next)
    }

    /// Set a single key and persist
    pub async fn set(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        let mut patch = Map::new();
        patch.insert(key.to_string(), value.into());
        self.update(patch).await.map(|_| ())
    }
}
