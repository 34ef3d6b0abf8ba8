//! Settings document
//!
//! Settings are a flat JSON object shared with collaborators the core does
//! not know about. The core reads the keys it owns and merges writes into the
//! document; it never replaces the document wholesale.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Playback volume (0.0 - 1.0)
pub const SETTING_VOLUME: &str = "volume";
/// Mute flag
pub const SETTING_MUTED: &str = "muted";
/// Shuffle flag
pub const SETTING_SHUFFLE: &str = "shuffle";
/// Repeat mode (`off`, `all`, `one`)
pub const SETTING_REPEAT_MODE: &str = "repeatMode";
/// Selected audio output device id
pub const SETTING_OUTPUT_DEVICE: &str = "outputDevice";
/// Library folders
pub const SETTING_FOLDERS: &str = "folders";
/// Rich presence toggle
pub const SETTING_PRESENCE_ENABLED: &str = "discordRPC";
/// Rich presence layout
pub const SETTING_PRESENCE_FORMAT: &str = "discordRPCFormat";
/// Scrobbling toggle
pub const SETTING_SCROBBLE_ENABLED: &str = "scrobbleEnabled";
/// Track list sort order
pub const SETTING_SORT_ORDER: &str = "sortOrder";
/// Album grid sort order
pub const SETTING_ALBUM_SORT_ORDER: &str = "albumSortOrder";

/// Default playback volume
pub const DEFAULT_VOLUME: f64 = 0.8;

/// Flat key-value settings document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings(Map<String, Value>);

impl Settings {
    /// Document written on first launch
    pub fn with_defaults() -> Self {
        let mut map = Map::new();
        map.insert(SETTING_VOLUME.into(), Value::from(DEFAULT_VOLUME));
        map.insert(SETTING_FOLDERS.into(), Value::Array(Vec::new()));
        Self(map)
    }

    /// Raw value of `key`
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Typed value of `key`, or `None` when missing or of the wrong shape
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.0
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(Value::as_f64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Set a single key
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Merge `patch` into the document; keys absent from `patch` are kept
    pub fn merge(&mut self, patch: Map<String, Value>) {
        for (key, value) in patch {
            self.0.insert(key, value);
        }
    }

    /// Fill keys missing from this document with values from `defaults`
    pub fn fill_missing(&mut self, defaults: &Settings) {
        for (key, value) in &defaults.0 {
            self.0.entry(key.clone()).or_insert_with(|| value.clone());
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Settings {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
