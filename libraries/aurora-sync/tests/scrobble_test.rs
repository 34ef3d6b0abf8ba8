//! Scrobble service integration tests against mock servers

use aurora_core::ids::md5_hex;
use aurora_core::{PlaybackStatus, RawTrack, StateUpdate, Track, TrackSource};
use aurora_sync::{
    LastfmClient, LastfmConfig, Listen, ListenBrainzClient, ScrobbleConsumer, ScrobbleService,
    SyncError, SyncHub,
};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ===== Test Helpers =====

fn create_track(duration: f64) -> Track {
    RawTrack {
        title: Some("Hyperballad".into()),
        artist: Some("Bjork".into()),
        album: Some("Post".into()),
        album_artist: Some("Bjork".into()),
        track: Some(4),
        duration: Some(duration),
        ..Default::default()
    }
    .normalize("/music/post/04.flac", "04", TrackSource::Local)
}

fn listen() -> Listen {
    Listen::from_track(
        &create_track(321.4),
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
    )
}

fn lastfm(server: &MockServer, session_key: &str) -> LastfmClient {
    LastfmClient::new(LastfmConfig {
        api_key: "key".into(),
        api_secret: "secret".into(),
        session_key: session_key.into(),
    })
    .unwrap()
    .with_api_url(format!("{}/2.0/", server.uri()))
}

/// Decode an `application/x-www-form-urlencoded` body
fn form_fields(body: &[u8]) -> std::collections::BTreeMap<String, String> {
    url::form_urlencoded::parse(body).into_owned().collect()
}

async fn json_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

#[test]
fn listen_drops_redundant_album_artist() {
    let listen = listen();
    assert_eq!(listen.album.as_deref(), Some("Post"));
    assert_eq!(listen.album_artist, None);
    assert_eq!(listen.track_number, Some(4));
}

// ===== Last.fm =====

mod lastfm {
    use super::*;

    #[tokio::test]
    async fn scrobble_posts_signed_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2.0/"))
            .and(body_string_contains("method=track.scrobble"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"scrobbles": {}})))
            .expect(1)
            .mount(&server)
            .await;

        lastfm(&server, "session").scrobble(&listen()).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let mut fields = form_fields(&requests[0].body);
        assert_eq!(fields["artist"], "Bjork");
        assert_eq!(fields["track"], "Hyperballad");
        assert_eq!(fields["album"], "Post");
        assert_eq!(fields["trackNumber"], "4");
        assert_eq!(fields["duration"], "321");
        assert_eq!(fields["timestamp"], "1709294400");
        assert_eq!(fields["sk"], "session");
        assert_eq!(fields["format"], "json");
        assert!(!fields.contains_key("albumArtist"));

        // Signature covers every field but itself and format
        let signature = fields.remove("api_sig").unwrap();
        let raw: String = fields
            .iter()
            .filter(|(k, _)| k.as_str() != "format")
            .map(|(k, v)| format!("{k}{v}"))
            .collect();
        assert_eq!(signature, md5_hex(format!("{raw}secret")));
    }

    #[tokio::test]
    async fn now_playing_has_no_timestamp() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"nowplaying": {}})))
            .mount(&server)
            .await;

        lastfm(&server, "session").now_playing(&listen()).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let fields = form_fields(&requests[0].body);
        assert_eq!(fields["method"], "track.updateNowPlaying");
        assert!(!fields.contains_key("timestamp"));
    }

    #[tokio::test]
    async fn api_error_surfaces_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(403)
                    .set_body_json(json!({"error": 9, "message": "Invalid session key"})),
            )
            .mount(&server)
            .await;

        let err = lastfm(&server, "stale").scrobble(&listen()).await.unwrap_err();
        assert!(matches!(err, SyncError::Service { code: 9, .. }), "{err:?}");
    }

    #[tokio::test]
    async fn missing_session_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = lastfm(&server, "").now_playing(&listen()).await.unwrap_err();
        assert!(matches!(err, SyncError::NotConfigured(_)));
    }
}

// ===== ListenBrainz =====

mod listenbrainz {
    use super::*;

    #[tokio::test]
    async fn single_listen_carries_timestamp_and_metadata() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/1/submit-listens"))
            .and(header("Authorization", "Token user-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        ListenBrainzClient::new("user-token")
            .unwrap()
            .with_api_url(server.uri())
            .scrobble(&listen())
            .await
            .unwrap();

        let body = &json_bodies(&server).await[0];
        assert_eq!(body["listen_type"], "single");
        let payload = &body["payload"][0];
        assert_eq!(payload["listened_at"], 1_709_294_400);
        assert_eq!(payload["track_metadata"]["artist_name"], "Bjork");
        assert_eq!(payload["track_metadata"]["track_name"], "Hyperballad");
        assert_eq!(payload["track_metadata"]["release_name"], "Post");
        let info = &payload["track_metadata"]["additional_info"];
        assert_eq!(info["duration_ms"], 321_400);
        assert_eq!(info["tracknumber"], 4);
        assert_eq!(info["media_player"], "Aurora Player");
    }

    #[tokio::test]
    async fn playing_now_omits_listened_at() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        ListenBrainzClient::new("t")
            .unwrap()
            .with_api_url(server.uri())
            .now_playing(&listen())
            .await
            .unwrap();

        let body = &json_bodies(&server).await[0];
        assert_eq!(body["listen_type"], "playing_now");
        assert!(body["payload"][0].get("listened_at").is_none());
    }

    #[tokio::test]
    async fn rejected_token_is_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid authorization token."))
            .mount(&server)
            .await;

        let err = ListenBrainzClient::new("bad")
            .unwrap()
            .with_api_url(server.uri())
            .scrobble(&listen())
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Http { status: 401, .. }), "{err:?}");
    }
}

// ===== End to end =====

#[tokio::test]
async fn consumer_scrobbles_once_past_half_the_track() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/1/submit-listens"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let client = ListenBrainzClient::new("t").unwrap().with_api_url(server.uri());
    let mut hub = SyncHub::new();
    hub.register(ScrobbleConsumer::new(client));

    hub.publish(&StateUpdate::TrackChanged {
        track: create_track(60.0),
        index: 0,
    });
    hub.publish(&StateUpdate::StatusChanged {
        status: PlaybackStatus::Playing,
    });
    for second in 0..=59 {
        hub.publish(&StateUpdate::Position {
            current_time: f64::from(second),
            duration: 60.0,
        });
    }
    hub.shutdown().await;

    let types: Vec<Value> = json_bodies(&server)
        .await
        .into_iter()
        .map(|b| b["listen_type"].clone())
        .collect();
    assert_eq!(types, vec![json!("playing_now"), json!("single")]);
}
