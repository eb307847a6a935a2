//! Two-tier sentiment and theme classification.
//!
//! Ordered keyword rules run first; the first matching rule wins. Only when
//! no rule matches is the remote service asked, and any remote failure
//! resolves to the default label.

use embrace_providers::{GenerationClient, KeyRotator};
use embrace_types::{Classification, Sentiment, Theme};

/// One row of a keyword table: any keyword present selects `label`.
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule<L> {
    pub keywords: &'static [&'static str],
    pub label: L,
}

impl<L: Copy> KeywordRule<L> {
    const fn new(keywords: &'static [&'static str], label: L) -> Self {
        Self { keywords, label }
    }

    fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|kw| lowered.contains(kw))
    }
}

pub const SENTIMENT_RULES: &[KeywordRule<Sentiment>] = &[
    KeywordRule::new(&["depress", "sad"], Sentiment::Depressed),
    KeywordRule::new(&["anx", "worry"], Sentiment::Anxious),
    KeywordRule::new(&["stress", "overwhelm"], Sentiment::Stressed),
    KeywordRule::new(&["happy", "good"], Sentiment::Positive),
];

pub const THEME_RULES: &[KeywordRule<Theme>] = &[
    KeywordRule::new(&["sleep", "tired", "insomnia"], Theme::Sleep),
    KeywordRule::new(&["lonely", "alone"], Theme::Loneliness),
    KeywordRule::new(&["work", "study", "exam"], Theme::Stress),
    KeywordRule::new(&["burnout"], Theme::Burnout),
    KeywordRule::new(&["anxi"], Theme::Anxiety),
    KeywordRule::new(&["sad", "cry", "depress"], Theme::Sadness),
    KeywordRule::new(&["resource", "recommend"], Theme::Resources),
];

/// Themes offered to the remote classifier. `resources` is keyword-only.
const REMOTE_THEMES: [Theme; 8] = [
    Theme::Stress,
    Theme::Sleep,
    Theme::Loneliness,
    Theme::Motivation,
    Theme::Sadness,
    Theme::Fear,
    Theme::Anger,
    Theme::None,
];

fn first_match<L: Copy>(rules: &[KeywordRule<L>], text: &str) -> Option<L> {
    let lowered = text.to_lowercase();
    rules
        .iter()
        .find(|rule| rule.matches(&lowered))
        .map(|rule| rule.label)
}

#[must_use]
pub fn keyword_sentiment(text: &str) -> Option<Sentiment> {
    first_match(SENTIMENT_RULES, text)
}

#[must_use]
pub fn keyword_theme(text: &str) -> Option<Theme> {
    first_match(THEME_RULES, text)
}

/// Keyword-only classification with defaults; never touches the network.
#[must_use]
pub fn keyword_classification(text: &str) -> Classification {
    Classification {
        sentiment: keyword_sentiment(text).unwrap_or_default(),
        theme: keyword_theme(text).unwrap_or_default(),
    }
}

fn sentiment_prompt(message: &str) -> String {
    let labels: Vec<&str> = Sentiment::ALL.iter().map(|s| s.as_str()).collect();
    format!(
        "Classify sentiment: [{}]. Msg: '{message}'. Label only.",
        labels.join(", ")
    )
}

fn theme_prompt(message: &str) -> String {
    let labels: Vec<&str> = REMOTE_THEMES.iter().map(|t| t.as_str()).collect();
    format!(
        "Classify theme: [{}]. Msg: '{message}'. Label only.",
        labels.join(", ")
    )
}

#[derive(Debug, Clone)]
pub struct Classifier {
    client: GenerationClient,
}

impl Classifier {
    pub fn new(client: GenerationClient) -> Self {
        Self { client }
    }

    pub async fn classify_sentiment(&self, keys: &mut KeyRotator, text: &str) -> Sentiment {
        if let Some(sentiment) = keyword_sentiment(text) {
            return sentiment;
        }
        match self.client.generate(keys, &sentiment_prompt(text)).await {
            Ok(raw) => Sentiment::from_model_label(&raw).unwrap_or_default(),
            Err(e) => {
                tracing::debug!(error = %e, "Remote sentiment classification failed");
                Sentiment::default()
            }
        }
    }

    pub async fn classify_theme(&self, keys: &mut KeyRotator, text: &str) -> Theme {
        if let Some(theme) = keyword_theme(text) {
            return theme;
        }
        match self.client.generate(keys, &theme_prompt(text)).await {
            Ok(raw) => Theme::from_model_label(&raw).unwrap_or_default(),
            Err(e) => {
                tracing::debug!(error = %e, "Remote theme classification failed");
                Theme::default()
            }
        }
    }

    pub async fn classify(&self, keys: &mut KeyRotator, text: &str) -> Classification {
        let sentiment = self.classify_sentiment(keys, text).await;
        let theme = self.classify_theme(keys, text).await;
        Classification { sentiment, theme }
    }
}
