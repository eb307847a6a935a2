//! Rule-based self-harm risk detection.
//!
//! Runs before anything fallible and never touches the network. Phrase
//! matching is ASCII case-insensitive substring search over a fixed list.

use std::sync::OnceLock;

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use embrace_types::{CrisisScore, Sentiment};

/// Explicit self-harm phrases. Any match short-circuits the turn.
pub const SELF_HARM_PHRASES: &[&str] = &[
    "suicide",
    "kill myself",
    "end my life",
    "self harm",
    "cut myself",
    "hurt myself",
];

/// Phrases that raise the score but do not short-circuit on their own.
pub const HOPELESSNESS_PHRASES: &[&str] = &[
    "can't go on",
    "can\u{2019}t go on",
    "pointless",
    "nothing matters",
];

/// Helpline shown on the crisis path.
pub const HOTLINE: &str = "9152987821";

pub const CRISIS_REPLY: &str = "I'm really sorry you're feeling this way 💛\n\n\
You deserve help and care. Here are people who can support you:\n\
• A close friend/family member\n\
• Aasra Suicide Hotline (India): **9152987821**\n\
• Emergency services if you're in danger\n\n\
Please stay with me. You matter and you're not alone.";

const SELF_HARM_WEIGHT: u8 = 2;
const HOPELESSNESS_WEIGHT: u8 = 1;
const URGENT_WEIGHT: u8 = 1;

struct PhraseSet {
    phrases: &'static [&'static str],
    automaton: Option<AhoCorasick>,
}

impl PhraseSet {
    fn build(phrases: &'static [&'static str]) -> Self {
        let automaton = match AhoCorasickBuilder::new()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::LeftmostFirst)
            .build(phrases)
        {
            Ok(ac) => Some(ac),
            Err(e) => {
                tracing::warn!("Crisis phrase automaton build failed; using linear scan ({e})");
                None
            }
        };
        Self { phrases, automaton }
    }

    fn is_match(&self, text: &str) -> bool {
        match &self.automaton {
            Some(ac) => ac.is_match(text),
            None => {
                let lower = text.to_ascii_lowercase();
                self.phrases.iter().any(|phrase| lower.contains(phrase))
            }
        }
    }
}

fn self_harm_phrases() -> &'static PhraseSet {
    static SET: OnceLock<PhraseSet> = OnceLock::new();
    SET.get_or_init(|| PhraseSet::build(SELF_HARM_PHRASES))
}

fn hopelessness_phrases() -> &'static PhraseSet {
    static SET: OnceLock<PhraseSet> = OnceLock::new();
    SET.get_or_init(|| PhraseSet::build(HOPELESSNESS_PHRASES))
}

/// The hard gate: any explicit self-harm phrase.
#[must_use]
pub fn contains_self_harm_phrase(text: &str) -> bool {
    self_harm_phrases().is_match(text)
}

#[must_use]
pub fn contains_hopelessness_phrase(text: &str) -> bool {
    hopelessness_phrases().is_match(text)
}

/// Additive risk score for `text` given its classified sentiment.
///
/// Rules are independent: +2 self-harm phrase, +1 hopelessness phrase,
/// +1 urgent sentiment. Clamped to `0..=3`.
#[must_use]
pub fn score(text: &str, sentiment: Sentiment) -> CrisisScore {
    let mut total = 0;
    if contains_self_harm_phrase(text) {
        total += SELF_HARM_WEIGHT;
    }
    if contains_hopelessness_phrase(text) {
        total += HOPELESSNESS_WEIGHT;
    }
    if sentiment == Sentiment::Urgent {
        total += URGENT_WEIGHT;
    }
    CrisisScore::new(total)
}
