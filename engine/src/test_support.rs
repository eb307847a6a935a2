//! Fake collaborators for engine unit tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use embrace_providers::{GenerateFut, GenerationError, TextGenerationService};
use embrace_types::Credential;

use crate::recommender::{QueryFut, ResourceStore, StoreError};

/// Answers every prompt with the same text and records the prompts.
pub(crate) struct RecordingService {
    reply: String,
    prompts: Mutex<Vec<String>>,
}

impl RecordingService {
    pub(crate) fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl TextGenerationService for RecordingService {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn generate<'a>(&'a self, _credential: &'a Credential, prompt: &'a str) -> GenerateFut<'a> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let reply = self.reply.clone();
        Box::pin(async move { Ok::<_, GenerationError>(reply) })
    }
}

/// Fails every call with a non-rotating error.
pub(crate) struct FailingService;

impl TextGenerationService for FailingService {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn generate<'a>(&'a self, _credential: &'a Credential, _prompt: &'a str) -> GenerateFut<'a> {
        Box::pin(async { Err::<String, _>(GenerationError::Transient("500 Internal Server Error".into())) })
    }
}

/// Never answers within `delay`.
pub(crate) struct SlowService {
    delay: Duration,
}

impl SlowService {
    pub(crate) fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self { delay })
    }
}

impl TextGenerationService for SlowService {
    fn name(&self) -> &'static str {
        "slow"
    }

    fn generate<'a>(&'a self, _credential: &'a Credential, _prompt: &'a str) -> GenerateFut<'a> {
        Box::pin(async move {
            tokio::time::sleep(self.delay).await;
            Ok::<_, GenerationError>("too late".to_string())
        })
    }
}

/// Resource store whose every query fails.
pub(crate) struct FailingStore;

impl ResourceStore for FailingStore {
    fn query_by_tags<'a>(&'a self, _tags: &'a [&'a str]) -> QueryFut<'a> {
        Box::pin(async { Err::<Vec<_>, _>(StoreError::Query("connection refused".into())) })
    }
}
