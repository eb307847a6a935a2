//! Credential rotation through the real Gemini client.

use wiremock::MockServer;
use wiremock::matchers::{header, method};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{
    gemini_body, gemini_companion, mount_gemini_reply_for_key, mount_gemini_status_for_key,
    request_count,
};

// Matches both keyword tables, so only the reply itself goes remote.
const KEYWORD_MESSAGE: &str = "I'm so stressed about work";

#[tokio::test]
async fn rate_limited_key_rotates_to_next() {
    let server = MockServer::start().await;
    mount_gemini_status_for_key(&server, "key-1", 429).await;
    mount_gemini_reply_for_key(&server, "key-2", "Let's slow down together.").await;
    let mut session = gemini_companion(&server, &["key-1", "key-2"]).session();

    let reply = session.process_turn(KEYWORD_MESSAGE).await;

    assert!(!reply.using_fallback);
    assert_eq!(reply.reply, "Let's slow down together.");
    assert_eq!(request_count(&server).await, 2);
}

#[tokio::test]
async fn overloaded_key_rotates_to_next() {
    let server = MockServer::start().await;
    mount_gemini_status_for_key(&server, "key-1", 503).await;
    mount_gemini_reply_for_key(&server, "key-2", "I'm with you.").await;
    let mut session = gemini_companion(&server, &["key-1", "key-2"]).session();

    let reply = session.process_turn(KEYWORD_MESSAGE).await;

    assert_eq!(reply.reply, "I'm with you.");
}

#[tokio::test]
async fn rotation_sticks_within_a_session_only() {
    let server = MockServer::start().await;
    mount_gemini_status_for_key(&server, "key-1", 429).await;
    mount_gemini_reply_for_key(&server, "key-2", "ok").await;
    let companion = gemini_companion(&server, &["key-1", "key-2"]);

    let mut first = companion.session();
    first.process_turn(KEYWORD_MESSAGE).await;
    assert_eq!(request_count(&server).await, 2);

    // The cursor already points at key-2 for this session.
    first.process_turn(KEYWORD_MESSAGE).await;
    assert_eq!(request_count(&server).await, 3);

    // A new session starts from the first key again.
    let mut second = companion.session();
    second.process_turn(KEYWORD_MESSAGE).await;
    assert_eq!(request_count(&server).await, 5);
}

#[tokio::test]
async fn single_rate_limited_key_fails_fast() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("x-goog-api-key", "only-key"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .expect(1)
        .mount(&server)
        .await;
    let mut session = gemini_companion(&server, &["only-key"]).session();

    let reply = session.process_turn(KEYWORD_MESSAGE).await;

    assert!(reply.using_fallback);
}

#[tokio::test]
async fn all_keys_rate_limited_visits_each_once() {
    let server = MockServer::start().await;
    for key in ["key-1", "key-2", "key-3"] {
        Mock::given(method("POST"))
            .and(header("x-goog-api-key", key))
            .respond_with(ResponseTemplate::new(429))
            .expect(1)
            .mount(&server)
            .await;
    }
    let mut session = gemini_companion(&server, &["key-1", "key-2", "key-3"]).session();

    let reply = session.process_turn(KEYWORD_MESSAGE).await;

    assert!(reply.using_fallback);
    assert_eq!(request_count(&server).await, 3);
}

#[tokio::test]
async fn prompt_carries_labels_and_memory() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body("noted")))
        .mount(&server)
        .await;
    let mut session = gemini_companion(&server, &["key-1"]).session();

    session.process_turn(KEYWORD_MESSAGE).await;
    session.process_turn("still stressed about work").await;

    let requests = server.received_requests().await.unwrap();
    let last = String::from_utf8_lossy(&requests.last().unwrap().body).to_string();
    assert!(last.contains("user: I'm so stressed about work"));
    assert!(last.contains("assistant: noted"));
    assert!(last.contains("Sentiment: stressed"));
    assert!(last.contains("Theme: stress"));
}
