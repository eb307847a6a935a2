//! Google Gemini `generateContent` client.
//!
//! One non-streaming request per call. HTTP failures are mapped onto the
//! [`GenerationError`] taxonomy so the retry layer can decide whether to
//! rotate credentials:
//!
//! | Response | Error |
//! |----------|-------|
//! | 429, or a body mentioning quota / `RESOURCE_EXHAUSTED` | `RateLimited` |
//! | 503 | `Overloaded` |
//! | transport failure, any other status, malformed body | `Transient` |

use embrace_types::Credential;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{GenerateFut, GenerationError, TextGenerationService, cap_error_body, http_client};

/// Canonical Gemini API base URL.
pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Clone)]
pub struct GeminiService {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl GeminiService {
    /// Client against the public endpoint using the shared hardened HTTP client.
    pub fn new(model: impl Into<String>) -> Self {
        Self::with_client(http_client().clone(), GEMINI_API_BASE_URL, model)
    }

    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    async fn generate_content(
        &self,
        credential: &Credential,
        prompt: &str,
    ) -> Result<String, GenerationError> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", credential.expose_secret())
            .header("content-type", "application/json")
            .json(&build_request_body(prompt))
            .send()
            .await
            .map_err(|e| GenerationError::Transient(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_http_error(status, &cap_error_body(body)));
        }

        let payload: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Transient(format!("invalid response body: {e}")))?;

        if let Some(error) = &payload.error {
            return Err(classify_http_error(status, &error.message));
        }

        Ok(payload.text())
    }
}

impl TextGenerationService for GeminiService {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn generate<'a>(&'a self, credential: &'a Credential, prompt: &'a str) -> GenerateFut<'a> {
        Box::pin(self.generate_content(credential, prompt))
    }
}

/// Build the request body for a single-turn prompt.
fn build_request_body(prompt: &str) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": prompt }]
        }]
    })
}

fn classify_http_error(status: StatusCode, body: &str) -> GenerationError {
    let detail = if body.trim().is_empty() {
        status.to_string()
    } else {
        format!("{status}: {}", body.trim())
    };
    let lower = body.to_ascii_lowercase();

    if status == StatusCode::TOO_MANY_REQUESTS
        || lower.contains("quota")
        || lower.contains("resource_exhausted")
    {
        GenerationError::RateLimited(detail)
    } else if status == StatusCode::SERVICE_UNAVAILABLE {
        GenerationError::Overloaded(detail)
    } else {
        GenerationError::Transient(detail)
    }
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

impl GenerateContentResponse {
    /// Concatenated visible text of the first candidate. Thought parts are skipped.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter(|part| !part.thought)
                    .filter_map(|part| part.text.as_deref())
                    .collect()
            })
            .unwrap_or_default()
    }
}
