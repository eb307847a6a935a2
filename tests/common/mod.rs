//! Shared test utilities and fixtures
//!
//! Common infrastructure for integration tests: a mock Gemini endpoint and
//! companions wired against it.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use embrace_engine::embrace_providers::gemini::GeminiService;
use embrace_engine::{Companion, CredentialPool, InMemoryResourceStore, RetryConfig};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const MODEL: &str = "gemini-2.5-flash";

pub const RESOURCES: &str = r#"[
    {"title": "Sleep hygiene basics", "type": "articles", "url": "https://example.com/sleep", "tags": ["sleep", "rest"], "category": "sleep"},
    {"title": "Box breathing", "type": "videos", "url": "https://example.com/box", "tags": ["anxiety", "stress", "calm"]},
    {"title": "Body scan", "type": "meditations", "url": "https://example.com/scan", "tags": ["calm", "meditation"]}
]"#;

pub fn generate_path() -> String {
    format!("/models/{MODEL}:generateContent")
}

pub fn gemini_body(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

/// Every generateContent call answers `text`.
pub async fn mount_gemini_reply(server: &MockServer, text: &str) {
    Mock::given(method("POST"))
        .and(path(generate_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body(text)))
        .mount(server)
        .await;
}

/// Calls made with `key` answer `text`.
pub async fn mount_gemini_reply_for_key(server: &MockServer, key: &str, text: &str) {
    Mock::given(method("POST"))
        .and(path(generate_path()))
        .and(header("x-goog-api-key", key))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body(text)))
        .mount(server)
        .await;
}

/// Calls made with `key` fail with `status`.
pub async fn mount_gemini_status_for_key(server: &MockServer, key: &str, status: u16) {
    Mock::given(method("POST"))
        .and(path(generate_path()))
        .and(header("x-goog-api-key", key))
        .respond_with(ResponseTemplate::new(status).set_body_json(serde_json::json!({
            "error": { "code": status, "message": "mock failure", "status": "UNAVAILABLE" }
        })))
        .mount(server)
        .await;
}

/// Every generateContent call fails with `status`.
pub async fn mount_gemini_status(server: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .and(path(generate_path()))
        .respond_with(ResponseTemplate::new(status).set_body_string("mock failure"))
        .mount(server)
        .await;
}

pub fn fast_retry() -> RetryConfig {
    RetryConfig {
        max_attempts: 3,
        backoff: Duration::from_millis(5),
        attempt_timeout: Duration::from_secs(5),
    }
}

/// A companion talking to `server` with the given credentials.
pub fn gemini_companion(server: &MockServer, keys: &[&str]) -> Companion {
    let service = GeminiService::with_client(reqwest::Client::new(), server.uri(), MODEL);
    Companion::new(
        Arc::new(service),
        CredentialPool::from_raw(keys.iter().copied()),
    )
    .with_retry(fast_retry())
}

pub fn resource_store() -> Arc<InMemoryResourceStore> {
    Arc::new(InMemoryResourceStore::from_json(RESOURCES).expect("fixture parses"))
}

pub async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map_or(0, |requests| requests.len())
}
