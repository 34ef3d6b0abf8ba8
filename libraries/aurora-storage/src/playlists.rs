//! Playlist persistence
//!
//! The whole store is a JSON array of [`Playlist`] records, read once at
//! startup and rewritten after every mutating call. Changes reach memory
//! only once the rewrite has succeeded.

use crate::error::{Result, StorageError};
use crate::json_file::{read_or_default, write_atomic};
use aurora_core::content_id;
use aurora_core::types::{Playlist, RuleMatch, SmartRule};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::info;

/// File-backed playlist store
#[derive(Debug)]
pub struct PlaylistStore {
    path: PathBuf,
    playlists: RwLock<Vec<Playlist>>,
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StorageError::InvalidInput(
            "Playlist name cannot be empty".to_string(),
        ));
    }
    Ok(name.to_string())
}

impl PlaylistStore {
    /// Load the store from `path` (missing or corrupt file ⇒ no playlists)
    pub async fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let playlists: Vec<Playlist> = read_or_default(&path).await;
        info!(count = playlists.len(), "Loaded playlists");
        Self {
            path,
            playlists: RwLock::new(playlists),
        }
    }

    /// All playlists in creation order
    pub async fn list(&self) -> Vec<Playlist> {
        self.playlists.read().await.clone()
    }

    pub async fn get(&self, id: &str) -> Result<Playlist> {
        self.playlists
            .read()
            .await
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| StorageError::not_found("Playlist", id))
    }

    /// Create an empty explicit playlist
    pub async fn create(&self, name: &str) -> Result<Playlist> {
        self.insert(validate_name(name)?, false, Vec::new(), RuleMatch::All)
            .await
    }

    /// Create a playlist whose membership is computed from `rules`
    pub async fn create_smart(
        &self,
        name: &str,
        rules: Vec<SmartRule>,
        rule_match: RuleMatch,
    ) -> Result<Playlist> {
        self.insert(validate_name(name)?, true, rules, rule_match)
            .await
    }

    async fn insert(
        &self,
        name: String,
        smart: bool,
        rules: Vec<SmartRule>,
        rule_match: RuleMatch,
    ) -> Result<Playlist> {
        let now = now_millis();
        let playlist = Playlist {
            id: content_id(format!("playlist-{name}-{now}")),
            name,
            track_ids: Vec::new(),
            created_at: now,
            updated_at: now,
            smart,
            rules,
            rule_match,
        };

        let mut playlists = self.playlists.write().await;
        let mut next = playlists.clone();
        next.push(playlist.clone());
        write_atomic(&self.path, &next).await?;
        *playlists = next;
        Ok(playlist)
    }

    /// Replace the rule set of a smart playlist
    pub async fn update_smart(
        &self,
        id: &str,
        name: &str,
        rules: Vec<SmartRule>,
        rule_match: RuleMatch,
    ) -> Result<Playlist> {
        let name = validate_name(name)?;
        self.modify(id, move |p| {
            if !p.smart {
                return Err(StorageError::InvalidInput(format!(
                    "Playlist {} is not a smart playlist",
                    p.id
                )));
            }
            p.name = name;
            p.rules = rules;
            p.rule_match = rule_match;
            Ok(())
        })
        .await
    }

    pub async fn rename(&self, id: &str, name: &str) -> Result<Playlist> {
        let name = validate_name(name)?;
        self.modify(id, move |p| {
            p.name = name;
            Ok(())
        })
        .await
    }

    /// Append track ids, skipping ids already present
    pub async fn add_tracks(&self, id: &str, track_ids: &[String]) -> Result<Playlist> {
        self.modify(id, |p| {
            for track_id in track_ids {
                if !p.track_ids.contains(track_id) {
                    p.track_ids.push(track_id.clone());
                }
            }
            Ok(())
        })
        .await
    }

    pub async fn remove_track(&self, id: &str, track_id: &str) -> Result<Playlist> {
        self.modify(id, |p| {
            p.track_ids.retain(|t| t != track_id);
            Ok(())
        })
        .await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let mut playlists = self.playlists.write().await;
        let mut next = playlists.clone();
        next.retain(|p| p.id != id);
        if next.len() == playlists.len() {
            return Err(StorageError::not_found("Playlist", id));
        }
        write_atomic(&self.path, &next).await?;
        *playlists = next;
        Ok(())
    }

    async fn modify<F>(&self, id: &str, change: F) -> Result<Playlist>
    where
        F: FnOnce(&mut Playlist) -> Result<()>,
    {
        let mut playlists = self.playlists.write().await;
        let mut next = playlists.clone();
        let playlist = next
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StorageError::not_found("Playlist", id))?;

        change(playlist)?;
        playlist.updated_at = now_millis();
        let updated = playlist.clone();

        write_atomic(&self.path, &next).await?;
        *playlists = next;
        Ok(updated)
    }
}
