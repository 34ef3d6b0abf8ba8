/// Shared helpers for host integration tests
use aurora_host::{config::HostConfig, state::AppState};
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::path::Path;
use tower::util::ServiceExt;

/// Write a short mono WAV file that the metadata reader accepts
pub fn write_wav(path: &Path) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 8000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..8000 {
        writer.write_sample(((i % 100) * 150) as i16).unwrap();
    }
    writer.finalize().unwrap();
}

/// Host config rooted in `data_dir` with network lookups switched off
pub fn test_config(data_dir: &Path) -> HostConfig {
    let mut config = HostConfig::default();
    config.storage.data_dir = data_dir.to_path_buf();
    config.library.flush_debounce_ms = 50;
    config.enrichment.enabled = false;
    config
}

pub async fn create_test_app(data_dir: &Path) -> (Router, AppState) {
    let state = AppState::init(&test_config(data_dir)).await.unwrap();
    (aurora_host::create_router(state.clone()), state)
}

/// POST a JSON body to `/ipc`; returns the status and parsed body
pub async fn ipc(app: &Router, request: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/ipc")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(request.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}
