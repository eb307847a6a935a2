//! Turn journal wiring through configuration.

use std::sync::Arc;

use embrace_engine::embrace_providers::gemini::GeminiService;
use embrace_engine::{EmbraceConfig, Role, StartupOptions, TurnJournal, companion_from_config};
use wiremock::MockServer;

use crate::common::{MODEL, mount_gemini_reply};

fn config_for(server: &MockServer, journal: &std::path::Path) -> EmbraceConfig {
    let toml = format!(
        r#"
        [api_keys]
        gemini = ["key-1"]

        [google]
        model = "{MODEL}"
        base_url = "{}"

        [generation]
        max_attempts = 2
        backoff_ms = 5

        [journal]
        enabled = true
        path = "{}"
        "#,
        server.uri(),
        journal.display()
    );
    toml::from_str(&toml).unwrap()
}

#[tokio::test]
async fn configured_journal_records_session_turns() {
    let server = MockServer::start().await;
    mount_gemini_reply(&server, "Thank you for telling me.").await;
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("journal.db");
    let config = config_for(&server, &db);

    let service = GeminiService::with_client(reqwest::Client::new(), config.base_url(), config.model());
    let companion = companion_from_config(&config, Arc::new(service), &StartupOptions::default());
    assert!(companion.is_online());

    let mut session = companion.session();
    session.process_turn("I've been so lonely this week").await;
    session.process_turn("I want to end my life").await;
    let session_id = session.id().to_string();
    drop(session);
    drop(companion);

    let journal = TurnJournal::open(&db).unwrap();
    let entries = journal.session_turns(&session_id).unwrap();
    assert_eq!(entries.len(), 2, "crisis turns are not journaled");
    assert_eq!(entries[0].role, Role::User);
    assert_eq!(entries[0].text, "I've been so lonely this week");
    assert_eq!(entries[1].role, Role::Assistant);
    assert_eq!(entries[1].text, "Thank you for telling me.");
}

#[tokio::test]
async fn no_journal_option_skips_database() {
    let server = MockServer::start().await;
    mount_gemini_reply(&server, "ok").await;
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("journal.db");
    let config = config_for(&server, &db);
    let options = StartupOptions {
        no_journal: true,
        ..StartupOptions::default()
    };

    let service = GeminiService::with_client(reqwest::Client::new(), config.base_url(), config.model());
    let companion = companion_from_config(&config, Arc::new(service), &options);
    companion.session().process_turn("hello").await;

    assert!(!db.exists());
}
