//! Session isolation and concurrency.

use std::time::Duration;

use embrace_engine::{ConversationMemory, Role};
use wiremock::MockServer;
use wiremock::{Mock, ResponseTemplate, matchers::method};

use crate::common::{gemini_body, gemini_companion, mount_gemini_reply};

#[tokio::test]
async fn memory_is_bounded_and_ordered() {
    let server = MockServer::start().await;
    mount_gemini_reply(&server, "I hear you.").await;
    let mut session = gemini_companion(&server, &["key-1"]).session();

    for i in 1..=4 {
        session.process_turn(&format!("stress update {i}")).await;
    }

    let turns = session.memory().snapshot();
    assert_eq!(turns.len(), ConversationMemory::CAPACITY);
    let texts: Vec<_> = turns.iter().map(|t| t.text()).collect();
    assert_eq!(
        texts,
        [
            "stress update 2",
            "I hear you.",
            "stress update 3",
            "I hear you.",
            "stress update 4",
            "I hear you.",
        ]
    );
    assert!(
        turns
            .iter()
            .step_by(2)
            .all(|t| t.role() == Role::User && t.sentiment().is_some())
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_sessions_do_not_share_memory() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(gemini_body("I'm here."))
                .set_delay(Duration::from_millis(20)),
        )
        .mount(&server)
        .await;
    let companion = gemini_companion(&server, &["key-1", "key-2"]);

    let mut handles = Vec::new();
    for user in 0..8 {
        let mut session = companion.session();
        handles.push(tokio::spawn(async move {
            for turn in 0..3 {
                session
                    .process_turn(&format!("user {user} is stressed, turn {turn}"))
                    .await;
            }
            session
        }));
    }

    for (user, handle) in handles.into_iter().enumerate() {
        let session = handle.await.unwrap();
        let turns = session.memory().snapshot();
        assert_eq!(turns.len(), 6);
        for turn in turns.iter().filter(|t| t.role() == Role::User) {
            assert!(
                turn.text().starts_with(&format!("user {user} ")),
                "session {user} saw {}",
                turn.text()
            );
        }
    }
}

#[tokio::test]
async fn cancelled_turn_uses_offline_reply_and_keeps_session_usable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(gemini_body("late"))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;
    let mut session = gemini_companion(&server, &["key-1"]).session();

    let reply = session
        .process_turn_until(
            "I'm stressed about work",
            tokio::time::sleep(Duration::from_millis(50)),
        )
        .await;

    assert!(reply.using_fallback);
    assert_eq!(session.memory().len(), 2);
}
