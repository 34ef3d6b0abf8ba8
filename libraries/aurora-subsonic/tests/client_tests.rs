//! Subsonic client tests against a mock server.

use aurora_core::TrackSource;
use aurora_subsonic::{token_for, SubsonicClient, SubsonicConfig, SubsonicError};
use serde_json::{json, Value};
use std::collections::HashMap;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// Helpers
// =============================================================================

fn ok(payload: Value) -> ResponseTemplate {
    let mut body = json!({"status": "ok", "version": "1.16.1"});
    if let (Some(body), Some(extra)) = (body.as_object_mut(), payload.as_object()) {
        body.extend(extra.clone());
    }
    ResponseTemplate::new(200).set_body_json(json!({ "subsonic-response": body }))
}

fn failed(code: i64, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "subsonic-response": {
            "status": "failed",
            "version": "1.16.1",
            "error": {"code": code, "message": message}
        }
    }))
}

fn client_for(server: &MockServer, legacy: bool) -> SubsonicClient {
    SubsonicClient::with_config(
        SubsonicConfig::new(server.uri(), "alice", "sesame").with_legacy_auth(legacy),
    )
    .unwrap()
}

async fn recorded_queries(server: &MockServer) -> Vec<HashMap<String, String>> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| r.url.query_pairs().into_owned().collect())
        .collect()
}

// =============================================================================
// Ping and authentication
// =============================================================================

mod ping {
    use super::*;

    #[tokio::test]
    async fn ping_ok_returns_true() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/ping"))
            .respond_with(ok(json!({})))
            .mount(&server)
            .await;

        assert!(client_for(&server, false).ping().await);
    }

    #[tokio::test]
    async fn ping_failed_status_returns_false() {
        let server = MockServer::start().await;
        Mock::given(path("/rest/ping"))
            .respond_with(failed(40, "Wrong username or password"))
            .mount(&server)
            .await;

        assert!(!client_for(&server, false).ping().await);
    }

    #[tokio::test]
    async fn ping_http_error_returns_false() {
        let server = MockServer::start().await;
        Mock::given(path("/rest/ping"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        assert!(!client_for(&server, false).ping().await);
    }

    #[tokio::test]
    async fn ping_unconfigured_returns_false() {
        let client = SubsonicClient::new().unwrap();
        assert!(!client.ping().await);
    }
}

mod auth {
    use super::*;

    #[tokio::test]
    async fn modern_auth_sends_salted_token() {
        let server = MockServer::start().await;
        Mock::given(path("/rest/ping"))
            .and(query_param("u", "alice"))
            .and(query_param("v", "1.16.1"))
            .and(query_param("c", "AuroraPlayer"))
            .and(query_param("f", "json"))
            .respond_with(ok(json!({})))
            .mount(&server)
            .await;

        let client = client_for(&server, false);
        assert!(client.ping().await);
        assert!(client.ping().await);

        let queries = recorded_queries(&server).await;
        assert_eq!(queries.len(), 2);
        for query in &queries {
            assert!(!query.contains_key("p"));
            assert_eq!(query["t"], token_for("sesame", &query["s"]));
        }
        assert_ne!(queries[0]["s"], queries[1]["s"], "salt must be fresh per request");
    }

    #[tokio::test]
    async fn legacy_auth_sends_encoded_password() {
        let server = MockServer::start().await;
        Mock::given(path("/rest/ping"))
            .and(query_param("p", "enc:736573616d65"))
            .respond_with(ok(json!({})))
            .mount(&server)
            .await;

        assert!(client_for(&server, true).ping().await);
    }
}

// =============================================================================
// Library fetch
// =============================================================================

mod library {
    use super::*;

    async fn mount_album_pages(server: &MockServer) {
        Mock::given(path("/rest/getAlbumList2"))
            .and(query_param("type", "alphabeticalByName"))
            .and(query_param("offset", "0"))
            .respond_with(ok(json!({
                "albumList2": {"album": [{"id": "a1", "name": "One"}, {"id": "a2", "name": "Two"}]}
            })))
            .mount(server)
            .await;
        Mock::given(path("/rest/getAlbumList2"))
            .and(query_param("offset", "2"))
            .respond_with(ok(json!({
                "albumList2": {"album": [{"id": "a3", "name": "Three"}]}
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn pages_until_short_page() {
        let server = MockServer::start().await;
        mount_album_pages(&server).await;

        let client = client_for(&server, false).with_page_size(2);
        let albums = client.fetch_all_albums().await.unwrap();

        let ids: Vec<&str> = albums.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a2", "a3"]);
    }

    #[tokio::test]
    async fn fetch_all_songs_skips_failing_albums() {
        let server = MockServer::start().await;
        mount_album_pages(&server).await;

        Mock::given(path("/rest/getAlbum"))
            .and(query_param("id", "a1"))
            .respond_with(ok(json!({
                "album": {
                    "id": "a1",
                    "name": "One",
                    "song": [
                        {"id": "s1", "title": "First", "artist": "X", "album": "One",
                         "track": 1, "duration": 200, "coverArt": "a1"},
                        {"id": "s2", "title": "Second", "artist": "X", "album": "One",
                         "track": 2, "discNumber": 2}
                    ]
                }
            })))
            .mount(&server)
            .await;
        // Single song collapsed to an object
        Mock::given(path("/rest/getAlbum"))
            .and(query_param("id", "a2"))
            .respond_with(ok(json!({
                "album": {"id": "a2", "name": "Two", "song": {"id": "s3", "title": "Only"}}
            })))
            .mount(&server)
            .await;
        Mock::given(path("/rest/getAlbum"))
            .and(query_param("id", "a3"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server, false).with_page_size(2);
        let tracks = client.fetch_all_songs().await.unwrap();

        assert_eq!(tracks.len(), 3);
        let first = &tracks[0];
        assert_eq!(first.id, "subsonic-s1");
        assert_eq!(first.path, "subsonic://s1");
        assert_eq!(first.duration, 200.0);
        assert_eq!(first.source, TrackSource::Subsonic);
        assert!(first
            .cover_art
            .as_deref()
            .unwrap()
            .starts_with(&format!("{}/rest/getCoverArt", server.uri())));
        assert_eq!(tracks[1].disc, 2);
        assert_eq!(tracks[2].title, "Only");
        assert_eq!(tracks[2].artist, "Unknown Artist");
    }

    #[tokio::test]
    async fn album_list_failure_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(path("/rest/getAlbumList2"))
            .respond_with(failed(50, "Not authorized"))
            .mount(&server)
            .await;

        let result = client_for(&server, false).fetch_all_songs().await;
        match result {
            Err(SubsonicError::Api { code, message }) => {
                assert_eq!(code, 50);
                assert_eq!(message, "Not authorized");
            }
            other => panic!("Expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_album_list_yields_no_tracks() {
        let server = MockServer::start().await;
        Mock::given(path("/rest/getAlbumList2"))
            .respond_with(ok(json!({"albumList2": {}})))
            .mount(&server)
            .await;

        let tracks = client_for(&server, false).fetch_all_songs().await.unwrap();
        assert!(tracks.is_empty());
    }
}

// =============================================================================
// Browsing
// =============================================================================

mod browsing {
    use super::*;

    #[tokio::test]
    async fn artists_are_flattened_across_index_groups() {
        let server = MockServer::start().await;
        Mock::given(path("/rest/getArtists"))
            .respond_with(ok(json!({
                "artists": {"index": [
                    {"name": "A", "artist": [{"id": "1", "name": "ABBA"}, {"id": "2", "name": "Air"}]},
                    {"name": "B", "artist": {"id": "3", "name": "Björk"}}
                ]}
            })))
            .mount(&server)
            .await;

        let artists = client_for(&server, false).get_artists().await.unwrap();
        let names: Vec<&str> = artists.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["ABBA", "Air", "Björk"]);
    }

    #[tokio::test]
    async fn artist_detail_includes_albums() {
        let server = MockServer::start().await;
        Mock::given(path("/rest/getArtist"))
            .and(query_param("id", "3"))
            .respond_with(ok(json!({
                "artist": {"id": "3", "name": "Björk", "albumCount": 1,
                           "album": [{"id": "al", "name": "Post"}]}
            })))
            .mount(&server)
            .await;

        let artist = client_for(&server, false).get_artist("3").await.unwrap();
        assert_eq!(artist.album.len(), 1);
        assert_eq!(artist.album[0].name, "Post");
    }

    #[tokio::test]
    async fn search_uses_fixed_counts() {
        let server = MockServer::start().await;
        Mock::given(path("/rest/search3"))
            .and(query_param("query", "blue"))
            .and(query_param("artistCount", "20"))
            .and(query_param("albumCount", "20"))
            .and(query_param("songCount", "50"))
            .respond_with(ok(json!({
                "searchResult3": {"song": [{"id": "s1", "title": "Blue in Green"}]}
            })))
            .mount(&server)
            .await;

        let results = client_for(&server, false).search("blue").await.unwrap();
        assert_eq!(results.songs.len(), 1);
        assert!(results.albums.is_empty());
    }
}
