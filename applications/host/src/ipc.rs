//! IPC messages exchanged over `POST /ipc`
//!
//! Requests and responses are closed, tagged enums. A request that names an
//! unknown `type` is rejected before it reaches any handler.

use aurora_core::{
    Album, Artist, PipelineCommand, PipelineEvent, PlaybackCommand, Playlist, RuleMatch,
    ScanProgress, Settings, SmartRule, Track,
};
use aurora_enrichment::{ArtistInfo, Lyrics};
use aurora_library::{AlbumSortOrder, TrackSortOrder};
use aurora_metadata::AudioDetails;
use aurora_playback::PlaybackSnapshot;
use aurora_subsonic::SubsonicConfig;
use aurora_sync::MediaControlCommand;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IpcRequest {
    // ===== Library =====
    ScanFolder {
        path: String,
    },
    RescanAll,
    RemoveFolder {
        path: String,
    },
    GetTracks {
        #[serde(default)]
        sort: Option<TrackSortOrder>,
    },
    GetFolders,
    GetAlbums {
        #[serde(default)]
        sort: Option<AlbumSortOrder>,
    },
    GetAlbumTracks {
        album_id: String,
    },
    GetArtists,
    Search {
        query: String,
    },
    GetScanProgress,
    GetAudioDetails {
        path: String,
    },
    /// `localfile://` URL for a local path
    MediaUrl {
        path: String,
    },

    // ===== Playback =====
    Playback {
        command: PlaybackCommand,
    },
    Pipeline {
        event: PipelineEvent,
    },
    /// Collect pipeline commands queued by background work
    PollPipeline,
    GetPlaybackState,
    MediaControl {
        command: MediaControlCommand,
    },

    // ===== Settings =====
    GetSettings,
    /// Merged into the stored document; absent keys are kept
    UpdateSettings {
        patch: Map<String, Value>,
    },

    // ===== Playlists =====
    ListPlaylists,
    GetPlaylist {
        id: String,
    },
    /// Member tracks; computed from the rules for smart playlists
    GetPlaylistTracks {
        id: String,
    },
    CreatePlaylist {
        name: String,
    },
    CreateSmartPlaylist {
        name: String,
        rules: Vec<SmartRule>,
        #[serde(default)]
        rule_match: RuleMatch,
    },
    UpdateSmartPlaylist {
        id: String,
        name: String,
        rules: Vec<SmartRule>,
        #[serde(default)]
        rule_match: RuleMatch,
    },
    RenamePlaylist {
        id: String,
        name: String,
    },
    DeletePlaylist {
        id: String,
    },
    AddToPlaylist {
        id: String,
        track_ids: Vec<String>,
    },
    RemoveFromPlaylist {
        id: String,
        track_id: String,
    },

    // ===== Favorites =====
    GetFavorites,
    ToggleFavorite {
        track_id: String,
    },

    // ===== Enrichment =====
    /// Sidecar `.lrc` next to the audio file only
    GetLyrics {
        path: String,
    },
    /// Sidecar first, then online; online results are saved as a sidecar
    FindLyrics {
        track: Track,
    },
    GetAlbumArt {
        artist: String,
        album: String,
    },
    GetArtistInfo {
        name: String,
    },

    // ===== Remote library =====
    SubsonicConfigure {
        config: SubsonicConfig,
    },
    SubsonicPing,
    /// Replace the remote part of the library with a fresh listing
    SubsonicSync,
    SubsonicDisconnect,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum IpcResponse {
    Ok,
    Tracks(Vec<Track>),
    Folders(Vec<String>),
    Library {
        folders: Vec<String>,
        tracks: Vec<Track>,
    },
    Albums(Vec<Album>),
    Artists(Vec<Artist>),
    ScanProgress(Option<ScanProgress>),
    AudioDetails(AudioDetails),
    Url(String),
    /// Commands for the audio pipeline to execute, in order
    Pipeline(Vec<PipelineCommand>),
    Playback(PlaybackSnapshot),
    Settings(Settings),
    Playlist(Playlist),
    Playlists(Vec<Playlist>),
    Favorites(Vec<String>),
    Favorite(bool),
    Lyrics(Option<Lyrics>),
    AlbumArt(Option<String>),
    ArtistInfo(Option<ArtistInfo>),
    Connected(bool),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn requests_are_tagged() {
        let request: IpcRequest = serde_json::from_value(json!({
            "type": "playback",
            "command": {"type": "seek", "position": 12.5}
        }))
        .unwrap();
        assert_eq!(
            request,
            IpcRequest::Playback {
                command: PlaybackCommand::Seek { position: 12.5 }
            }
        );

        let request: IpcRequest =
            serde_json::from_value(json!({"type": "get_tracks"})).unwrap();
        assert_eq!(request, IpcRequest::GetTracks { sort: None });

        let unknown = serde_json::from_value::<IpcRequest>(json!({"type": "format_disk"}));
        assert!(unknown.is_err());
    }

    #[test]
    fn responses_carry_data_beside_the_tag() {
        let value = serde_json::to_value(IpcResponse::Favorite(true)).unwrap();
        assert_eq!(value, json!({"type": "favorite", "data": true}));

        let value = serde_json::to_value(IpcResponse::Ok).unwrap();
        assert_eq!(value, json!({"type": "ok"}));
    }
}
