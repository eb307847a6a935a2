//! Reply orchestration.
//!
//! [`Companion`] holds everything shared between users: the generation
//! client, the credential pool, the resource store and the journal.
//! [`Session`] holds everything owned by one conversation: its memory and
//! its credential cursor.
//!
//! # Turn state machine
//!
//! ```text
//! Start ─► CrisisCheck ─┬─► CrisisReply                              (terminal)
//!                       └─► Classify ─► MemoryUpdate ─► Generate ─┬─► UseGenerated ─┐
//!                                                                 └─► UseFallback ──┤
//!           Done ◄── SelectTool ◄── MemoryUpdateAssistant ◄── Recommend ◄───────────┘
//! ```
//!
//! Crisis detection runs before anything fallible. Every remote step runs
//! under the turn budget; once the budget is spent the remaining remote
//! steps are skipped and the offline bank supplies the reply.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use embrace_context::{ConversationMemory, TurnJournal};
use embrace_providers::{
    CredentialPool, GenerationClient, KeyRotator, RetryConfig, TextGenerationService,
};
use embrace_types::{
    Classification, CrisisLevel, CrisisScore, NonEmptyString, ReplyComposition, Sentiment, Theme,
    Turn,
};
use uuid::Uuid;

use crate::classifier::{self, Classifier};
use crate::recommender::{self, ResourceStore};
use crate::{crisis, offline, prompt, tools};

/// Reply for empty or whitespace-only input.
pub const EMPTY_MESSAGE_REPLY: &str =
    "Please type a message so I can understand how you're feeling.";

const DEFAULT_TURN_TIMEOUT: Duration = Duration::from_secs(90);

/// Shared companion engine. Cheap to clone.
#[derive(Clone)]
pub struct Companion {
    generator: GenerationClient,
    classifier: Classifier,
    pool: CredentialPool,
    store: Option<Arc<dyn ResourceStore>>,
    journal: Option<Arc<Mutex<TurnJournal>>>,
    turn_timeout: Duration,
}

impl std::fmt::Debug for Companion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Companion")
            .field("generator", &self.generator)
            .field("credentials", &self.pool.len())
            .field("store", &self.store.is_some())
            .field("journal", &self.journal.is_some())
            .field("turn_timeout", &self.turn_timeout)
            .finish()
    }
}

impl Companion {
    pub fn new(service: Arc<dyn TextGenerationService>, pool: CredentialPool) -> Self {
        let generator = GenerationClient::new(service, RetryConfig::default());
        Self {
            classifier: Classifier::new(generator.clone()),
            generator,
            pool,
            store: None,
            journal: None,
            turn_timeout: DEFAULT_TURN_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_retry(self, config: RetryConfig) -> Self {
        let generator = GenerationClient::new(self.generator.service(), config);
        Self {
            classifier: Classifier::new(generator.clone()),
            generator,
            ..self
        }
    }

    #[must_use]
    pub fn with_resource_store(mut self, store: Arc<dyn ResourceStore>) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn with_journal(mut self, journal: TurnJournal) -> Self {
        self.journal = Some(Arc::new(Mutex::new(journal)));
        self
    }

    #[must_use]
    pub fn with_turn_timeout(mut self, timeout: Duration) -> Self {
        self.turn_timeout = timeout;
        self
    }

    /// Remote generation is possible only with at least one credential.
    #[must_use]
    pub fn is_online(&self) -> bool {
        !self.pool.is_empty()
    }

    /// A fresh session with empty memory and its own credential cursor.
    #[must_use]
    pub fn session(&self) -> Session {
        let session = Session {
            id: Uuid::new_v4(),
            companion: self.clone(),
            memory: ConversationMemory::new(),
            keys: self.pool.rotator(),
            seq: 0,
        };
        tracing::debug!(session = %session.id, online = self.is_online(), "Session started");
        session
    }
}

/// Why the turn budget ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopReason {
    Cancelled,
    DeadlineElapsed,
}

type StopFut<'a> = Pin<Box<dyn Future<Output = StopReason> + Send + 'a>>;

/// Remote work allowance for one turn: a deadline raced with caller cancellation.
struct TurnBudget<'a> {
    stop: StopFut<'a>,
    spent: Option<StopReason>,
}

impl<'a> TurnBudget<'a> {
    fn new(cancelled: impl Future<Output = ()> + Send + 'a, timeout: Duration) -> Self {
        let stop = Box::pin(async move {
            tokio::select! {
                () = cancelled => StopReason::Cancelled,
                () = tokio::time::sleep(timeout) => StopReason::DeadlineElapsed,
            }
        });
        Self { stop, spent: None }
    }

    /// Drive `work` unless the budget is already spent or runs out first.
    async fn run<T>(&mut self, work: impl Future<Output = T>) -> Option<T> {
        if self.spent.is_some() {
            return None;
        }
        tokio::select! {
            biased;
            out = work => Some(out),
            reason = &mut self.stop => {
                self.spent = Some(reason);
                None
            }
        }
    }
}

/// One user's conversation.
pub struct Session {
    id: Uuid,
    companion: Companion,
    memory: ConversationMemory,
    keys: KeyRotator,
    seq: u64,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("turns", &self.memory.len())
            .field("credential_slot", &self.keys.index())
            .finish_non_exhaustive()
    }
}

impl Session {
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    /// Process one message under the configured turn timeout.
    pub async fn process_turn(&mut self, message: &str) -> ReplyComposition {
        self.process_turn_until(message, std::future::pending()).await
    }

    /// Process one message, abandoning remote work once `cancelled` resolves.
    ///
    /// Always returns a well-formed reply; remote failures and cancellation
    /// surface only as `using_fallback = true`.
    pub async fn process_turn_until(
        &mut self,
        message: &str,
        cancelled: impl Future<Output = ()> + Send,
    ) -> ReplyComposition {
        let Ok(user_text) = NonEmptyString::new(message) else {
            return empty_message_reply();
        };

        if crisis::contains_self_harm_phrase(message) {
            tracing::warn!(session = %self.id, "Crisis phrase detected; returning safety reply");
            return crisis_reply(message);
        }

        let mut budget = TurnBudget::new(cancelled, self.companion.turn_timeout);

        let labels = budget
            .run(self.companion.classifier.classify(&mut self.keys, message))
            .await
            .unwrap_or_else(|| classifier::keyword_classification(message));
        let crisis_score = crisis::score(message, labels.sentiment);

        self.remember(Turn::user(user_text, labels));

        let prompt = prompt::build_reply_prompt(&self.memory.transcript(), message, labels);
        let generated = budget
            .run(self.companion.generator.generate(&mut self.keys, &prompt))
            .await;

        let (mut reply, using_fallback) = match generated {
            Some(Ok(text)) if !text.trim().is_empty() => (text.trim().to_string(), false),
            Some(Ok(_)) => {
                tracing::warn!(session = %self.id, "Generation returned empty text; using offline reply");
                (offline::fallback(message).to_string(), true)
            }
            Some(Err(e)) => {
                tracing::warn!(session = %self.id, error = %e, "Generation failed; using offline reply");
                (offline::fallback(message).to_string(), true)
            }
            None => {
                tracing::warn!(
                    session = %self.id,
                    reason = ?budget.spent,
                    "Generation abandoned; using offline reply"
                );
                (offline::fallback(message).to_string(), true)
            }
        };

        if let Some(store) = self.companion.store.clone()
            && let Some(Some(resource)) = budget
                .run(recommender::recommend(
                    store.as_ref(),
                    labels.theme,
                    labels.sentiment,
                    message,
                ))
                .await
        {
            reply.push_str(&recommender::format_suffix(&resource));
        }

        if let Ok(assistant_text) = NonEmptyString::new(reply.clone()) {
            self.remember(Turn::assistant(assistant_text));
        }

        let recommended_tool = tools::choose(labels.sentiment, labels.theme);

        ReplyComposition {
            reply,
            sentiment: labels.sentiment,
            theme: Some(labels.theme),
            crisis_level: CrisisLevel::Normal,
            crisis_score,
            immediate_action: false,
            recommended_tool: Some(recommended_tool.to_string()),
            needs_followup: labels.sentiment.needs_followup(),
            using_fallback,
        }
    }

    /// Append to memory and, best-effort, to the journal.
    fn remember(&mut self, turn: Turn) {
        self.seq += 1;
        if let Some(journal) = &self.companion.journal {
            let result = match journal.lock() {
                Ok(journal) => journal.append(&self.id.to_string(), self.seq, &turn),
                Err(_) => Err(anyhow::anyhow!("turn journal lock poisoned")),
            };
            if let Err(e) = result {
                tracing::warn!(session = %self.id, seq = self.seq, "Failed to journal turn: {e:#}");
            }
        }
        self.memory.append(turn);
    }
}

fn empty_message_reply() -> ReplyComposition {
    ReplyComposition {
        reply: EMPTY_MESSAGE_REPLY.to_string(),
        sentiment: Sentiment::Neutral,
        theme: Some(Theme::None),
        crisis_level: CrisisLevel::Normal,
        crisis_score: CrisisScore::default(),
        immediate_action: false,
        recommended_tool: Some(tools::GENERIC_OFFER.to_string()),
        needs_followup: false,
        using_fallback: false,
    }
}

/// Safety reply. Uses keyword labels only so nothing remote runs on this path.
fn crisis_reply(message: &str) -> ReplyComposition {
    let Classification { sentiment, .. } = classifier::keyword_classification(message);
    ReplyComposition {
        reply: crisis::CRISIS_REPLY.to_string(),
        sentiment: Sentiment::Urgent,
        theme: None,
        crisis_level: CrisisLevel::High,
        crisis_score: crisis::score(message, sentiment),
        immediate_action: true,
        recommended_tool: None,
        needs_followup: false,
        using_fallback: false,
    }
}
