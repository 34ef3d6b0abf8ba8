/// IPC integration tests
/// Full request/response cycles through `POST /ipc` against a temp data dir
mod common;

use axum::http::StatusCode;
use common::{create_test_app, ipc, write_wav};
use serde_json::{json, Value};
use tempfile::TempDir;

fn track_paths(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["path"].as_str().unwrap().to_string())
        .collect()
}

/// Three WAV files in a fresh music folder
fn music_folder() -> TempDir {
    let music = TempDir::new().unwrap();
    for name in ["a.wav", "b.wav", "c.wav"] {
        write_wav(&music.path().join(name));
    }
    music
}

#[tokio::test]
async fn scan_then_list_the_library() {
    let data = TempDir::new().unwrap();
    let music = music_folder();
    let (app, _state) = create_test_app(data.path()).await;
    let folder = music.path().to_string_lossy().to_string();

    let (status, body) = ipc(&app, json!({"type": "scan_folder", "path": folder})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "tracks");
    assert_eq!(track_paths(&body).len(), 3);

    let (_, body) = ipc(&app, json!({"type": "get_folders"})).await;
    assert_eq!(body, json!({"type": "folders", "data": [folder]}));

    let (_, body) = ipc(&app, json!({"type": "get_scan_progress"})).await;
    assert_eq!(body["data"]["total"], 3);

    let (_, body) = ipc(&app, json!({"type": "search", "query": "b"})).await;
    assert!(track_paths(&body)
        .iter()
        .any(|p| p.ends_with("b.wav")));
}

#[tokio::test]
async fn removing_a_folder_returns_what_is_left() {
    let data = TempDir::new().unwrap();
    let music = music_folder();
    let (app, _state) = create_test_app(data.path()).await;
    let folder = music.path().to_string_lossy().to_string();

    ipc(&app, json!({"type": "scan_folder", "path": folder})).await;
    let (status, body) = ipc(&app, json!({"type": "remove_folder", "path": folder})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"type": "library", "data": {"folders": [], "tracks": []}})
    );
}

#[tokio::test]
async fn play_all_hands_back_a_media_url() {
    let data = TempDir::new().unwrap();
    let music = music_folder();
    let (app, _state) = create_test_app(data.path()).await;
    let folder = music.path().to_string_lossy().to_string();

    let (_, body) = ipc(&app, json!({"type": "scan_folder", "path": folder})).await;
    let tracks = body["data"].clone();

    let (status, body) = ipc(
        &app,
        json!({
            "type": "playback",
            "command": {"type": "play_all", "tracks": tracks, "start_index": 0}
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "pipeline");

    let load = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["type"] == "load")
        .expect("a load command");
    let url = load["url"].as_str().unwrap();
    assert!(url.starts_with("http://127.0.0.1:7878/media/"), "{url}");

    ipc(&app, json!({"type": "pipeline", "event": {"type": "playing"}})).await;
    let (_, body) = ipc(&app, json!({"type": "get_playback_state"})).await;
    assert_eq!(body["data"]["status"], "playing");
    assert_eq!(body["data"]["queue"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn playback_errors_are_client_errors() {
    let data = TempDir::new().unwrap();
    let (app, _state) = create_test_app(data.path()).await;

    let (status, body) = ipc(
        &app,
        json!({"type": "playback", "command": {"type": "remove_from_queue", "index": 4}}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn playlists_resolve_against_the_library() {
    let data = TempDir::new().unwrap();
    let music = music_folder();
    let (app, _state) = create_test_app(data.path()).await;
    let folder = music.path().to_string_lossy().to_string();

    let (_, body) = ipc(&app, json!({"type": "scan_folder", "path": folder})).await;
    let ids: Vec<Value> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].clone())
        .collect();

    let (status, body) = ipc(&app, json!({"type": "create_playlist", "name": "Mix"})).await;
    assert_eq!(status, StatusCode::OK);
    let playlist_id = body["data"]["id"].as_str().unwrap().to_string();

    let (_, body) = ipc(
        &app,
        json!({
            "type": "add_to_playlist",
            "id": playlist_id,
            "track_ids": [ids[2], ids[0], "missing-track"]
        }),
    )
    .await;
    assert_eq!(body["data"]["trackIds"].as_array().unwrap().len(), 3);

    let (_, body) = ipc(&app, json!({"type": "get_playlist_tracks", "id": playlist_id})).await;
    let resolved: Vec<Value> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].clone())
        .collect();
    assert_eq!(resolved, vec![ids[2].clone(), ids[0].clone()]);

    let (status, _) = ipc(&app, json!({"type": "get_playlist", "id": "nope"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn favorites_toggle() {
    let data = TempDir::new().unwrap();
    let (app, _state) = create_test_app(data.path()).await;

    let (_, body) = ipc(&app, json!({"type": "toggle_favorite", "track_id": "t1"})).await;
    assert_eq!(body, json!({"type": "favorite", "data": true}));

    let (_, body) = ipc(&app, json!({"type": "get_favorites"})).await;
    assert_eq!(body, json!({"type": "favorites", "data": ["t1"]}));

    let (_, body) = ipc(&app, json!({"type": "toggle_favorite", "track_id": "t1"})).await;
    assert_eq!(body, json!({"type": "favorite", "data": false}));
}

#[tokio::test]
async fn settings_patches_merge_into_the_document() {
    let data = TempDir::new().unwrap();
    let (app, _state) = create_test_app(data.path()).await;

    ipc(
        &app,
        json!({"type": "update_settings", "patch": {"theme": "dark"}}),
    )
    .await;
    let (status, body) = ipc(
        &app,
        json!({"type": "update_settings", "patch": {"crossfade": 3}}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["theme"], "dark");
    assert_eq!(body["data"]["crossfade"], 3);
}

#[tokio::test]
async fn playback_state_is_persisted_on_shutdown() {
    let data = TempDir::new().unwrap();
    let (app, state) = create_test_app(data.path()).await;

    ipc(
        &app,
        json!({"type": "playback", "command": {"type": "set_volume", "volume": 0.25}}),
    )
    .await;
    ipc(
        &app,
        json!({"type": "playback", "command": {"type": "set_shuffle", "enabled": true}}),
    )
    .await;
    state.shutdown().await;

    let (_, body) = ipc(&app, json!({"type": "get_settings"})).await;
    assert_eq!(body["data"]["volume"], 0.25);
    assert_eq!(body["data"]["shuffle"], true);
}

#[tokio::test]
async fn lyrics_come_from_the_sidecar_when_offline() {
    let data = TempDir::new().unwrap();
    let music = TempDir::new().unwrap();
    let (app, _state) = create_test_app(data.path()).await;

    let audio = music.path().join("song.mp3");
    std::fs::write(&audio, b"not really audio").unwrap();
    std::fs::write(music.path().join("song.lrc"), "[00:01.00]Hello").unwrap();

    let (_, body) = ipc(
        &app,
        json!({"type": "get_lyrics", "path": audio.to_string_lossy()}),
    )
    .await;
    assert_eq!(body["data"]["content"], "[00:01.00]Hello");
    assert_eq!(body["data"]["source"], "local");

    let (_, body) = ipc(
        &app,
        json!({"type": "get_album_art", "artist": "Bjork", "album": "Post"}),
    )
    .await;
    assert_eq!(body, json!({"type": "album_art", "data": null}));
}

#[tokio::test]
async fn remote_sync_requires_a_configured_server() {
    let data = TempDir::new().unwrap();
    let (app, _state) = create_test_app(data.path()).await;

    let (status, _) = ipc(&app, json!({"type": "subsonic_sync"})).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn unknown_request_types_are_rejected() {
    let data = TempDir::new().unwrap();
    let (app, _state) = create_test_app(data.path()).await;

    let (status, _) = ipc(&app, json!({"type": "format_disk"})).await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn health_reports_the_library_size() {
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::util::ServiceExt;

    let data = TempDir::new().unwrap();
    let (app, _state) = create_test_app(data.path()).await;

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["tracks"], 0);
    assert_eq!(body["remote_configured"], false);
}
