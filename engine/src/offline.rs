//! Canned replies for when remote generation is unavailable.

use rand::seq::IndexedRandom;

/// A keyword-triggered group of interchangeable replies.
#[derive(Debug, Clone, Copy)]
pub struct Bucket {
    pub keyword: &'static str,
    pub replies: &'static [&'static str],
}

/// Checked in order; the first bucket whose keyword appears wins.
pub const BUCKETS: &[Bucket] = &[
    Bucket {
        keyword: "anxi",
        replies: &[
            "I hear that you're feeling anxious. Take a gentle breath with me. I'm here to support you through this.",
            "Anxiety can be overwhelming, but it doesn't define you. I'm listening. What's on your mind?",
            "It's okay to feel anxious. You are safe here. Want to try a quick grounding exercise?",
        ],
    },
    Bucket {
        keyword: "sleep",
        replies: &[
            "Sleep struggles are so exhausting. I'm sorry you're going through this.",
            "It sounds like rest has been difficult lately. I'm here to keep you company.",
            "Racing thoughts at night are common. Would you like to try a relaxation technique?",
        ],
    },
    Bucket {
        keyword: "sad",
        replies: &[
            "I'm really sorry you're feeling down. It takes courage to sit with these feelings.",
            "It's okay not to be okay. I'm here to listen to whatever you want to share.",
            "Sadness is a heavy weight. You don't have to carry it alone right now.",
        ],
    },
    Bucket {
        keyword: "stress",
        replies: &[
            "It sounds like you're carrying a heavy load. Remember to be gentle with yourself.",
            "That sounds incredibly overwhelming. Let's take this one moment at a time.",
            "Stress is a valid response to what you're facing. I'm here for you.",
        ],
    },
    Bucket {
        keyword: "hello",
        replies: &[
            "Hello! I'm Embrace. I'm here to listen and support you. How are you feeling right now?",
            "Hi there. This is a safe space. How can I support you today?",
        ],
    },
];

pub const DEFAULT_REPLIES: &[&str] = &[
    "I'm listening. Please tell me more about that.",
    "I hear you. Thank you for sharing that with me.",
    "I'm here with you. How does that make you feel?",
    "That sounds important. I'm listening.",
];

/// The replies a message would draw from.
#[must_use]
pub fn bucket_for(text: &str) -> &'static [&'static str] {
    let lowered = text.to_lowercase();
    BUCKETS
        .iter()
        .find(|bucket| lowered.contains(bucket.keyword))
        .map_or(DEFAULT_REPLIES, |bucket| bucket.replies)
}

/// A canned reply for `text`, chosen uniformly within its bucket. Never empty.
#[must_use]
pub fn fallback(text: &str) -> &'static str {
    bucket_for(text)
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(DEFAULT_REPLIES[0])
}
