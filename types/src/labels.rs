//! Emotional state and topic labels attached to user messages.

use serde::{Deserialize, Serialize};

/// Emotional state of a single message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    #[default]
    Neutral,
    Stressed,
    Anxious,
    Depressed,
    Urgent,
}

impl Sentiment {
    pub const ALL: [Sentiment; 6] = [
        Sentiment::Positive,
        Sentiment::Neutral,
        Sentiment::Stressed,
        Sentiment::Anxious,
        Sentiment::Depressed,
        Sentiment::Urgent,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Stressed => "stressed",
            Sentiment::Anxious => "anxious",
            Sentiment::Depressed => "depressed",
            Sentiment::Urgent => "urgent",
        }
    }

    /// Parse an exact (case-insensitive) label.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(label.trim()))
    }

    /// Parse a free-form label produced by a language model.
    ///
    /// Unknown labels yield `None`; callers pick their own default.
    #[must_use]
    pub fn from_model_label(raw: &str) -> Option<Self> {
        parse_model_label(raw, Self::parse)
    }

    /// Whether this state warrants a check-in on the next turn.
    #[must_use]
    pub const fn needs_followup(self) -> bool {
        matches!(
            self,
            Sentiment::Stressed | Sentiment::Anxious | Sentiment::Depressed
        )
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse topic of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Stress,
    Sleep,
    Loneliness,
    Burnout,
    Anxiety,
    Sadness,
    Resources,
    #[default]
    None,
    Motivation,
    Fear,
    Anger,
}

impl Theme {
    pub const ALL: [Theme; 11] = [
        Theme::Stress,
        Theme::Sleep,
        Theme::Loneliness,
        Theme::Burnout,
        Theme::Anxiety,
        Theme::Sadness,
        Theme::Resources,
        Theme::None,
        Theme::Motivation,
        Theme::Fear,
        Theme::Anger,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Theme::Stress => "stress",
            Theme::Sleep => "sleep",
            Theme::Loneliness => "loneliness",
            Theme::Burnout => "burnout",
            Theme::Anxiety => "anxiety",
            Theme::Sadness => "sadness",
            Theme::Resources => "resources",
            Theme::None => "none",
            Theme::Motivation => "motivation",
            Theme::Fear => "fear",
            Theme::Anger => "anger",
        }
    }

    /// Parse an exact (case-insensitive) label.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(label.trim()))
    }

    /// Parse a free-form label produced by a language model.
    #[must_use]
    pub fn from_model_label(raw: &str) -> Option<Self> {
        parse_model_label(raw, Self::parse)
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sentiment and theme derived for one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Classification {
    pub sentiment: Sentiment,
    pub theme: Theme,
}

/// Models answer "Anxious.", "**sleep**" or "Label: stress". Strip the
/// decoration, then try the whole answer before falling back to its words.
fn parse_model_label<T>(raw: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
    let is_decoration = |c: char| !c.is_alphanumeric() && c != '-';
    let cleaned = raw.trim().trim_matches(is_decoration).to_lowercase();
    if cleaned.is_empty() {
        return None;
    }
    parse(&cleaned).or_else(|| {
        cleaned
            .split(|c: char| c.is_whitespace() || c == ':' || c == ',')
            .map(|word| word.trim_matches(is_decoration))
            .filter(|word| !word.is_empty())
            .find_map(&parse)
    })
}
