//! Favorite tracks

use crate::error::Result;
use crate::json_file::{read_or_default, write_atomic};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// Ordered set of favorite track ids, persisted as a JSON array
#[derive(Debug)]
pub struct FavoritesStore {
    path: PathBuf,
    ids: RwLock<Vec<String>>,
}

impl FavoritesStore {
    pub async fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let mut ids: Vec<String> = read_or_default(&path).await;
        let mut seen = std::collections::HashSet::new();
        ids.retain(|id| seen.insert(id.clone()));
        Self {
            path,
            ids: RwLock::new(ids),
        }
    }

    pub async fn list(&self) -> Vec<String> {
        self.ids.read().await.clone()
    }

    pub async fn contains(&self, track_id: &str) -> bool {
        self.ids.read().await.iter().any(|id| id == track_id)
    }

    /// Flip the favorite flag of `track_id`, returning the new state
    pub async fn toggle(&self, track_id: &str) -> Result<bool> {
        let mut ids = self.ids.write().await;
        let mut next = ids.clone();
        let now_favorite = if let Some(pos) = next.iter().position(|id| id == track_id) {
            next.remove(pos);
            false
        } else {
            next.push(track_id.to_string());
            true
        };
        write_atomic(&self.path, &next).await?;
        *ids = next;
        Ok(now_favorite)
    }
}
