//! The composed result of one conversational turn.

use serde::{Deserialize, Serialize};

use crate::{Sentiment, Theme};

/// Risk level reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrisisLevel {
    #[default]
    Normal,
    High,
}

/// Additive self-harm risk score, always within `0..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct CrisisScore(u8);

impl CrisisScore {
    pub const MAX: u8 = 3;

    /// Clamp a raw rule total into range.
    #[must_use]
    pub const fn new(raw: u8) -> Self {
        if raw > Self::MAX {
            Self(Self::MAX)
        } else {
            Self(raw)
        }
    }

    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl From<u8> for CrisisScore {
    fn from(raw: u8) -> Self {
        Self::new(raw)
    }
}

impl From<CrisisScore> for u8 {
    fn from(score: CrisisScore) -> Self {
        score.0
    }
}

/// Read-only projection of an external resource record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
}

impl Resource {
    /// Videos and meditations are watched or followed along; everything else is read.
    #[must_use]
    pub fn is_audiovisual(&self) -> bool {
        matches!(
            self.kind.trim().to_ascii_lowercase().as_str(),
            "video" | "videos" | "meditation" | "meditations"
        )
    }
}

/// Response returned to the caller for every turn.
///
/// `using_fallback` is the only externally visible signal that the remote
/// generation path was degraded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyComposition {
    pub reply: String,
    pub sentiment: Sentiment,
    pub theme: Option<Theme>,
    pub crisis_level: CrisisLevel,
    pub crisis_score: CrisisScore,
    pub immediate_action: bool,
    pub recommended_tool: Option<String>,
    pub needs_followup: bool,
    pub using_fallback: bool,
}
