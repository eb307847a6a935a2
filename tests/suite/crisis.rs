//! Crisis short-circuit behaviour end to end.

use embrace_engine::crisis::{HOTLINE, SELF_HARM_PHRASES};
use embrace_engine::{CrisisLevel, Sentiment};
use wiremock::MockServer;

use crate::common::{gemini_companion, mount_gemini_reply, request_count, resource_store};

#[tokio::test]
async fn end_my_life_returns_hotline() {
    let server = MockServer::start().await;
    mount_gemini_reply(&server, "should never be used").await;
    let mut session = gemini_companion(&server, &["key-1"]).session();

    let reply = session.process_turn("I want to end my life").await;

    assert!(reply.reply.contains(HOTLINE));
    assert_eq!(reply.crisis_level, CrisisLevel::High);
    assert!(reply.immediate_action);
    assert_eq!(reply.sentiment, Sentiment::Urgent);
    assert!(!reply.using_fallback);
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn every_phrase_short_circuits_without_touching_memory() {
    let server = MockServer::start().await;
    mount_gemini_reply(&server, "I'm here for you.").await;
    let mut session = gemini_companion(&server, &["key-1"])
        .with_resource_store(resource_store())
        .session();

    session.process_turn("I'm stressed about exams").await;
    let before = session.memory().snapshot();
    let calls_before = request_count(&server).await;

    for phrase in SELF_HARM_PHRASES {
        let message = format!("Lately I keep thinking I might {phrase}");
        let reply = session.process_turn(&message).await;

        assert_eq!(reply.crisis_level, CrisisLevel::High, "{phrase}");
        assert_eq!(reply.sentiment, Sentiment::Urgent, "{phrase}");
        assert_eq!(reply.recommended_tool, None, "{phrase}");
        assert!(!reply.reply.contains("I also found a resource"), "{phrase}");
    }

    assert_eq!(session.memory().snapshot(), before);
    assert_eq!(request_count(&server).await, calls_before);
}

#[tokio::test]
async fn hopelessness_alone_is_not_a_crisis() {
    let server = MockServer::start().await;
    mount_gemini_reply(&server, "That sounds really heavy.").await;
    let mut session = gemini_companion(&server, &["key-1"]).session();

    let reply = session.process_turn("I feel sad, everything is pointless").await;

    assert_eq!(reply.crisis_level, CrisisLevel::Normal);
    assert_eq!(reply.crisis_score.value(), 1);
    assert_eq!(reply.reply, "That sounds really heavy.");
    assert!(reply.needs_followup);
}

#[tokio::test]
async fn crisis_reply_serializes_expected_shape() {
    let server = MockServer::start().await;
    let mut session = gemini_companion(&server, &[]).session();

    let reply = session.process_turn("I want to hurt myself").await;
    let value = serde_json::to_value(&reply).unwrap();

    assert_eq!(value["crisis_level"], "high");
    assert_eq!(value["sentiment"], "urgent");
    assert_eq!(value["immediate_action"], true);
    assert!(value["theme"].is_null());
    assert!(value["recommended_tool"].is_null());
}
