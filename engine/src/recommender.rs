//! Tag-based resource recommendation against an external store.
//!
//! Recommendation is a best-effort enhancement: every failure mode,
//! including store errors, resolves to `None`.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use rand::seq::IndexedRandom;
use serde::Deserialize;

use embrace_types::{Resource, Sentiment, Theme};

/// Tags seeded when the user explicitly asks for a resource.
const REQUEST_TAGS: &[&str] = &["calm", "stress", "meditation"];
const REQUEST_KEYWORDS: &[&str] = &["recommend", "resource"];

/// Theme to resource tags. Themes absent here contribute nothing.
const THEME_TAGS: &[(Theme, &[&str])] = &[
    (Theme::Stress, &["stress", "anxiety", "calm"]),
    (Theme::Anxiety, &["anxiety", "panic", "worry"]),
    (Theme::Sleep, &["sleep", "insomnia", "rest"]),
    (Theme::Sadness, &["depression", "sadness", "mood"]),
    (Theme::Loneliness, &["connection", "loneliness"]),
    (Theme::Motivation, &["motivation", "productivity"]),
    (Theme::Fear, &["fear", "courage"]),
];

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read resources at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse resources at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("resource query failed: {0}")]
    Query(String),
}

pub type QueryFut<'a> = Pin<Box<dyn Future<Output = Result<Vec<Resource>, StoreError>> + Send + 'a>>;

/// Source of resources, queried by tag intersection.
pub trait ResourceStore: Send + Sync {
    /// Every resource carrying at least one of `tags`.
    fn query_by_tags<'a>(&'a self, tags: &'a [&'a str]) -> QueryFut<'a>;
}

/// Tags for a classified message; empty means "nothing to recommend".
#[must_use]
pub fn derive_tags(theme: Theme, sentiment: Sentiment, raw_message: &str) -> Vec<&'static str> {
    let mut tags = Vec::new();

    let lowered = raw_message.to_lowercase();
    let explicit_request = REQUEST_KEYWORDS.iter().any(|kw| lowered.contains(kw));
    if explicit_request && matches!(theme, Theme::Resources | Theme::None) {
        tags.extend_from_slice(REQUEST_TAGS);
    }

    if let Some((_, theme_tags)) = THEME_TAGS.iter().find(|(t, _)| *t == theme) {
        tags.extend_from_slice(theme_tags);
    }

    if tags.is_empty() {
        match sentiment {
            Sentiment::Stressed | Sentiment::Anxious => tags.extend(["anxiety", "stress"]),
            Sentiment::Depressed => tags.extend(["depression", "mood"]),
            _ => {}
        }
    }

    tags
}

/// Pick one matching resource at random.
pub async fn recommend(
    store: &dyn ResourceStore,
    theme: Theme,
    sentiment: Sentiment,
    raw_message: &str,
) -> Option<Resource> {
    let tags = derive_tags(theme, sentiment, raw_message);
    if tags.is_empty() {
        return None;
    }

    let matches = match store.query_by_tags(&tags).await {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!(error = %e, "Resource lookup failed");
            return None;
        }
    };

    matches.choose(&mut rand::rng()).cloned()
}

/// Reply suffix announcing a recommended resource.
#[must_use]
pub fn format_suffix(resource: &Resource) -> String {
    let icon = if resource.is_audiovisual() { "📺" } else { "📖" };
    format!(
        "\n\nI also found a resource for you: {icon} {}\n{}",
        resource.title, resource.url
    )
}

/// A resource record as stored on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceRecord {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl ResourceRecord {
    fn has_any_tag(&self, tags: &[&str]) -> bool {
        self.tags
            .iter()
            .any(|own| tags.iter().any(|wanted| own.trim().eq_ignore_ascii_case(wanted)))
    }

    fn projection(&self) -> Resource {
        Resource {
            title: self.title.clone(),
            kind: self.kind.clone(),
            url: self.url.clone(),
        }
    }
}

/// Resource store backed by a list held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryResourceStore {
    records: Vec<ResourceRecord>,
}

impl InMemoryResourceStore {
    pub fn new(records: Vec<ResourceRecord>) -> Self {
        Self { records }
    }

    /// Load a JSON array of resource records.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json).map(Self::new)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ResourceStore for InMemoryResourceStore {
    fn query_by_tags<'a>(&'a self, tags: &'a [&'a str]) -> QueryFut<'a> {
        let matches: Vec<Resource> = self
            .records
            .iter()
            .filter(|record| record.has_any_tag(tags))
            .map(ResourceRecord::projection)
            .collect();
        Box::pin(std::future::ready(Ok::<_, StoreError>(matches)))
    }
}
