//! Conversation turns.

use serde::{Deserialize, Serialize};

use crate::{Classification, NonEmptyString, Sentiment, Theme};

/// Author of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message exchange unit. Immutable once constructed.
///
/// User turns carry the labels computed for them; assistant turns never do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    role: Role,
    text: NonEmptyString,
    sentiment: Option<Sentiment>,
    theme: Option<Theme>,
}

impl Turn {
    #[must_use]
    pub fn user(text: NonEmptyString, labels: Classification) -> Self {
        Self {
            role: Role::User,
            text,
            sentiment: Some(labels.sentiment),
            theme: Some(labels.theme),
        }
    }

    #[must_use]
    pub fn assistant(text: NonEmptyString) -> Self {
        Self {
            role: Role::Assistant,
            text,
            sentiment: None,
            theme: None,
        }
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    #[must_use]
    pub const fn sentiment(&self) -> Option<Sentiment> {
        self.sentiment
    }

    #[must_use]
    pub const fn theme(&self) -> Option<Theme> {
        self.theme
    }
}
