//! Persists playback preferences as they change

use crate::error::Result;
use crate::hub::StateConsumer;
use async_trait::async_trait;
use aurora_core::settings::{
    SETTING_MUTED, SETTING_REPEAT_MODE, SETTING_SHUFFLE, SETTING_VOLUME,
};
use aurora_core::StateUpdate;
use aurora_storage::SettingsStore;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Writes volume, mute, shuffle and repeat into the settings document
///
/// Writes merge into the stored document, so keys owned by other
/// collaborators are preserved.
pub struct SettingsConsumer {
    store: Arc<SettingsStore>,
}

impl SettingsConsumer {
    pub fn new(store: Arc<SettingsStore>) -> Self {
        Self { store }
    }
}

/// Settings patch for an update, if it carries a persisted preference
pub fn settings_patch(update: &StateUpdate) -> Option<Map<String, Value>> {
    let mut patch = Map::new();
    match update {
        StateUpdate::Volume { volume, muted } => {
            patch.insert(SETTING_VOLUME.into(), (*volume).into());
            patch.insert(SETTING_MUTED.into(), (*muted).into());
        }
        StateUpdate::Shuffle { enabled } => {
            patch.insert(SETTING_SHUFFLE.into(), (*enabled).into());
        }
        StateUpdate::Repeat { mode } => {
            patch.insert(SETTING_REPEAT_MODE.into(), mode.as_str().into());
        }
        _ => return None,
    }
    Some(patch)
}

#[async_trait]
impl StateConsumer for SettingsConsumer {
    fn name(&self) -> &str {
        "settings"
    }

    async fn handle(&mut self, update: &StateUpdate) -> Result<()> {
        if let Some(patch) = settings_patch(update) {
            self.store.update(patch).await?;
        }
        Ok(())
    }
}
