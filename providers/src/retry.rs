//! Bounded retry around a single remote generation call.
//!
//! # Retry Policy
//!
//! - Max attempts: 3
//! - Fixed backoff between attempts: 1 second
//! - Each attempt is bounded by `attempt_timeout`
//!
//! # Rotation
//!
//! - Rate-limited or overloaded: rotate the credential, then retry if another
//!   credential exists; with a single credential, give up immediately
//! - Any other failure: back off and retry on the same credential
//!
//! Worst-case latency is `max_attempts * (attempt_timeout + backoff)`.

use std::sync::Arc;
use std::time::Duration;

use crate::{GenerationError, KeyRotator, TextGenerationService};

/// Retry configuration.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Fixed delay between attempts.
    pub backoff: Duration,
    /// Upper bound for one remote call.
    pub attempt_timeout: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(1),
            attempt_timeout: Duration::from_secs(30),
        }
    }
}

/// Terminal outcome when the client gives up.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationFailure {
    #[error("generation unavailable: no credentials configured")]
    Unavailable,
    #[error("no spare credential after rate limit: {last}")]
    NoSpareCredential { last: GenerationError },
    #[error("generation failed after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: GenerationError },
}

/// A [`TextGenerationService`] wrapped with the retry and rotation policy.
#[derive(Clone)]
pub struct GenerationClient {
    service: Arc<dyn TextGenerationService>,
    config: RetryConfig,
}

impl std::fmt::Debug for GenerationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationClient")
            .field("service", &self.service.name())
            .field("config", &self.config)
            .finish()
    }
}

impl GenerationClient {
    pub fn new(service: Arc<dyn TextGenerationService>, config: RetryConfig) -> Self {
        Self { service, config }
    }

    #[must_use]
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    #[must_use]
    pub fn service(&self) -> Arc<dyn TextGenerationService> {
        Arc::clone(&self.service)
    }

    /// Generate a reply, rotating `keys` as the policy dictates.
    ///
    /// Blank text is returned as-is; deciding that it counts as a failure is
    /// the caller's job.
    pub async fn generate(
        &self,
        keys: &mut KeyRotator,
        prompt: &str,
    ) -> Result<String, GenerationFailure> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut last = GenerationError::Unavailable;

        for attempt in 1..=max_attempts {
            let Ok(credential) = keys.current() else {
                return Err(GenerationFailure::Unavailable);
            };

            let call = self.service.generate(credential, prompt);
            let error = match tokio::time::timeout(self.config.attempt_timeout, call).await {
                Ok(Ok(text)) => return Ok(text),
                Ok(Err(e)) => e,
                Err(_) => GenerationError::Timeout(self.config.attempt_timeout),
            };

            tracing::warn!(
                service = self.service.name(),
                attempt,
                max_attempts,
                error = %error,
                "Generation attempt failed"
            );

            if error.is_rotation_trigger() {
                keys.rotate();
                if keys.len() <= 1 {
                    return Err(GenerationFailure::NoSpareCredential { last: error });
                }
            }

            last = error;
            if attempt < max_attempts {
                tracing::debug!(
                    attempt,
                    delay_ms = self.config.backoff.as_millis(),
                    "Retrying generation after backoff"
                );
                tokio::time::sleep(self.config.backoff).await;
            }
        }

        Err(GenerationFailure::Exhausted {
            attempts: max_attempts,
            last,
        })
    }
}
