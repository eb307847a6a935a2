//! Remote text generation with credential rotation and bounded retry.
//!
//! # Architecture
//!
//! - [`TextGenerationService`] - the remote capability: one prompt in, one reply out
//! - [`gemini`] - Google Gemini implementation (GenerateContent API)
//! - [`keys`] - credential pool and per-session round-robin [`KeyRotator`]
//! - [`retry`] - [`GenerationClient`], which wraps a service with the retry policy
//!
//! # Error Handling
//!
//! A single remote call fails with a [`GenerationError`]. The client folds
//! those into a terminal [`GenerationFailure`] once it gives up. Neither ever
//! escapes the orchestration layer; callers degrade to offline replies instead.

pub mod gemini;
pub mod keys;
pub mod retry;

pub use embrace_types;
pub use keys::{CredentialPool, KeyRotator};
pub use retry::{GenerationClient, GenerationFailure, RetryConfig};

use embrace_types::Credential;
use std::future::Future;
use std::pin::Pin;
use std::sync::OnceLock;
use std::time::Duration;

const CONNECT_TIMEOUT_SECS: u64 = 30;

// Note: reqwest only exposes tcp_keepalive (idle time); interval/retries use platform defaults.
const TCP_KEEPALIVE_SECS: u64 = 60;

const POOL_MAX_IDLE_PER_HOST: usize = 32;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;

pub(crate) const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

/// Failure of a single remote generation call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("no credentials configured")]
    Unavailable,
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("service overloaded: {0}")]
    Overloaded(String),
    #[error("remote error: {0}")]
    Transient(String),
    #[error("attempt timed out after {0:?}")]
    Timeout(Duration),
}

impl GenerationError {
    /// Rate-limit and overload responses are tied to the credential, so the
    /// next attempt should use a different one.
    #[must_use]
    pub const fn is_rotation_trigger(&self) -> bool {
        matches!(self, Self::RateLimited(_) | Self::Overloaded(_))
    }
}

pub type GenerateFut<'a> = Pin<Box<dyn Future<Output = Result<String, GenerationError>> + Send + 'a>>;

/// A remote service that turns a prompt into text.
///
/// Implementations perform exactly one call per invocation; retry and
/// rotation live in [`GenerationClient`]. An `Ok` with blank text is a valid
/// outcome here and is judged by the caller.
pub trait TextGenerationService: Send + Sync {
    fn name(&self) -> &'static str;
    fn generate<'a>(&'a self, credential: &'a Credential, prompt: &'a str) -> GenerateFut<'a>;
}

pub fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        base_client_builder().build().unwrap_or_else(|e| {
            tracing::error!("Failed to build hardened HTTP client: {e}. Using reqwest defaults.");
            reqwest::Client::new()
        })
    })
}

fn base_client_builder() -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .user_agent(concat!("embrace/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .redirect(reqwest::redirect::Policy::none())
        .https_only(true)
        .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
        .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
}

/// Truncate an error body on a char boundary so logs stay bounded.
pub(crate) fn cap_error_body(mut body: String) -> String {
    if body.len() <= MAX_ERROR_BODY_BYTES {
        return body;
    }
    let mut cut = MAX_ERROR_BODY_BYTES;
    while !body.is_char_boundary(cut) {
        cut -= 1;
    }
    body.truncate(cut);
    body.push_str("...(truncated)");
    body
}
