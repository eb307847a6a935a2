//! Conversational engine for Embrace.
//!
//! Classifies each message, screens it for crisis risk, generates an
//! empathetic reply (degrading to canned replies when the remote service is
//! unavailable), recommends a resource and suggests a coping tool.
//!
//! # Architecture
//!
//! ```text
//! Companion (shared)
//! ├── classifier: Classifier (keyword rules, remote fallback)
//! ├── generator: GenerationClient (retry + rotation)
//! ├── pool: CredentialPool (immutable)
//! ├── store: ResourceStore (optional)
//! └── journal: TurnJournal (optional)
//!
//! Session (per conversation)
//! ├── memory: ConversationMemory
//! └── keys: KeyRotator
//! ```

use std::path::PathBuf;
use std::sync::Arc;

mod classifier;
mod config;
pub mod crisis;
pub mod offline;
mod prompt;
pub mod recommender;
mod session;
pub mod tools;

#[cfg(test)]
mod test_support;

pub use classifier::{
    Classifier, KeywordRule, SENTIMENT_RULES, THEME_RULES, keyword_classification,
    keyword_sentiment, keyword_theme,
};
pub use config::{ConfigError, EmbraceConfig, config_path, expand_env_vars};
pub use embrace_context::{ConversationMemory, JournalEntry, TurnJournal};
pub use embrace_providers::{
    self, CredentialPool, GenerationClient, RetryConfig, TextGenerationService,
};
pub use embrace_types::{
    Classification, CrisisLevel, CrisisScore, ReplyComposition, Resource, Role, Sentiment, Theme,
    Turn,
};
pub use prompt::build_reply_prompt;
pub use recommender::{InMemoryResourceStore, ResourceRecord, ResourceStore, StoreError};
pub use session::{Companion, EMPTY_MESSAGE_REPLY, Session};

/// Startup switches that override the config file.
#[derive(Debug, Clone, Default)]
pub struct StartupOptions {
    /// Ignore every configured credential.
    pub offline: bool,
    /// Resource file to load instead of the configured one.
    pub resources: Option<PathBuf>,
    /// Skip the turn journal regardless of config.
    pub no_journal: bool,
}

/// Build a companion from configuration.
///
/// Missing or unreadable optional collaborators (resource file, journal) are
/// logged and skipped; the companion always starts.
pub fn companion_from_config(
    config: &EmbraceConfig,
    service: Arc<dyn TextGenerationService>,
    options: &StartupOptions,
) -> Companion {
    let credentials = if options.offline {
        Vec::new()
    } else {
        config.credentials()
    };
    let pool = CredentialPool::from_raw(credentials);
    if pool.is_empty() {
        tracing::info!("No generation credentials configured; running offline");
    } else {
        tracing::info!(credentials = pool.len(), "Generation credentials loaded");
    }

    let mut companion = Companion::new(service, pool)
        .with_retry(config.retry_config())
        .with_turn_timeout(config.turn_timeout());

    let resources = options.resources.clone().or_else(|| config.resources_path());
    if let Some(path) = resources {
        match InMemoryResourceStore::load(&path) {
            Ok(store) => {
                tracing::info!(path = %path.display(), resources = store.len(), "Resource store loaded");
                companion = companion.with_resource_store(Arc::new(store));
            }
            Err(e) if options.resources.is_some() => {
                tracing::warn!("Resource store unavailable: {e}");
            }
            Err(e) => {
                tracing::debug!("No resource store: {e}");
            }
        }
    }

    if !options.no_journal
        && let Some(path) = config.journal_path()
    {
        match TurnJournal::open(&path) {
            Ok(journal) => companion = companion.with_journal(journal),
            Err(e) => tracing::warn!(path = %path.display(), "Turn journal unavailable: {e:#}"),
        }
    }

    companion
}
