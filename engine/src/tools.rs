//! Coping tool library and the selection table.

use embrace_types::{Sentiment, Theme};

/// Families of coping exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Breathing,
    Grounding,
    Journal,
    Motivation,
    Sleep,
}

/// A single coping exercise with a stable identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopingTool {
    pub id: &'static str,
    pub kind: ToolKind,
    pub text: &'static str,
}

pub const BREATHING_CALM: CopingTool = CopingTool {
    id: "breathing.calm",
    kind: ToolKind::Breathing,
    text: "Let's try 4-7-8 breathing:\nInhale 4s → Hold 7s → Exhale 8s. Repeat 4 times.",
};

pub const BREATHING_PANIC: CopingTool = CopingTool {
    id: "breathing.panic",
    kind: ToolKind::Breathing,
    text: "Try box breathing:\n4s inhale → 4s hold → 4s exhale → 4s hold — repeat slowly.",
};

pub const BREATHING_SLEEP: CopingTool = CopingTool {
    id: "breathing.sleep",
    kind: ToolKind::Breathing,
    text: "Slow breathing for sleep:\nInhale 5s → Exhale 7s. Continue for 1 minute.",
};

pub const GROUNDING_BASIC: CopingTool = CopingTool {
    id: "grounding.basic",
    kind: ToolKind::Grounding,
    text: "5-4-3-2-1 grounding:\n5 things you see\n4 you can touch\n3 you hear\n2 you smell\n1 you taste.",
};

pub const GROUNDING_OVERTHINKING: CopingTool = CopingTool {
    id: "grounding.overthinking",
    kind: ToolKind::Grounding,
    text: "Name 3 neutral facts around you. This helps break overthinking loops.",
};

pub const GROUNDING_ANXIETY: CopingTool = CopingTool {
    id: "grounding.anxiety",
    kind: ToolKind::Grounding,
    text: "Put both feet on the floor, take one deep breath, and describe one object near you.",
};

pub const JOURNAL_STRESS: CopingTool = CopingTool {
    id: "journal.stress",
    kind: ToolKind::Journal,
    text: "→ What is one thing causing pressure today? What part of it is in your control?",
};

pub const JOURNAL_ANXIETY: CopingTool = CopingTool {
    id: "journal.anxiety",
    kind: ToolKind::Journal,
    text: "→ What fear is standing out right now? What evidence do you have against it?",
};

pub const JOURNAL_MOTIVATION: CopingTool = CopingTool {
    id: "journal.motivation",
    kind: ToolKind::Journal,
    text: "→ What is one small win you had recently, even if tiny?",
};

pub const JOURNAL_SADNESS: CopingTool = CopingTool {
    id: "journal.sadness",
    kind: ToolKind::Journal,
    text: "→ What is something you wish someone understood about you?",
};

pub const MOTIVATION_BURNOUT: CopingTool = CopingTool {
    id: "motivation.burnout",
    kind: ToolKind::Motivation,
    text: "You're carrying a lot. Rest is not failure — it's fuel.",
};

pub const MOTIVATION_STUDY: CopingTool = CopingTool {
    id: "motivation.study",
    kind: ToolKind::Motivation,
    text: "Small steps count. 10 minutes of focus is progress.",
};

pub const MOTIVATION_SELF_ESTEEM: CopingTool = CopingTool {
    id: "motivation.self_esteem",
    kind: ToolKind::Motivation,
    text: "You are doing better than you think. Please be kind to yourself.",
};

pub const MOTIVATION_GENERAL: CopingTool = CopingTool {
    id: "motivation.general",
    kind: ToolKind::Motivation,
    text: "One difficult moment doesn’t define you. You’re stronger than you realize.",
};

pub const SLEEP_RACING_THOUGHTS: CopingTool = CopingTool {
    id: "sleep.racing_thoughts",
    kind: ToolKind::Sleep,
    text: "Try writing down all thoughts in a list — a 'brain dump'. It reduces mental load.",
};

pub const SLEEP_REST: CopingTool = CopingTool {
    id: "sleep.rest",
    kind: ToolKind::Sleep,
    text: "Dim the lights, avoid screens, and try breathing: In 4s, out 6s.",
};

pub const SLEEP_COMFORT: CopingTool = CopingTool {
    id: "sleep.comfort",
    kind: ToolKind::Sleep,
    text: "Imagine a safe place. Describe it: colors, sounds, temperature.",
};

pub const LIBRARY: &[CopingTool] = &[
    BREATHING_CALM,
    BREATHING_PANIC,
    BREATHING_SLEEP,
    GROUNDING_BASIC,
    GROUNDING_OVERTHINKING,
    GROUNDING_ANXIETY,
    JOURNAL_STRESS,
    JOURNAL_ANXIETY,
    JOURNAL_MOTIVATION,
    JOURNAL_SADNESS,
    MOTIVATION_BURNOUT,
    MOTIVATION_STUDY,
    MOTIVATION_SELF_ESTEEM,
    MOTIVATION_GENERAL,
    SLEEP_RACING_THOUGHTS,
    SLEEP_REST,
    SLEEP_COMFORT,
];

/// Suggested when nothing more specific applies.
pub const GENERIC_OFFER: &str =
    "If you'd like, I can guide breathing, grounding, journaling, or motivation.";

/// The tool for a classified message, or `None` for the generic offer.
#[must_use]
pub fn select(sentiment: Sentiment, theme: Theme) -> Option<CopingTool> {
    match (sentiment, theme) {
        (Sentiment::Stressed | Sentiment::Anxious, _) => Some(BREATHING_CALM),
        (_, Theme::Sleep) => Some(SLEEP_REST),
        (_, Theme::Loneliness) => Some(JOURNAL_SADNESS),
        (_, Theme::Burnout) => Some(MOTIVATION_BURNOUT),
        (Sentiment::Depressed, _) => Some(GROUNDING_BASIC),
        (_, Theme::Motivation) => Some(MOTIVATION_STUDY),
        _ => None,
    }
}

/// Text of the suggested tool. Always non-empty.
#[must_use]
pub fn choose(sentiment: Sentiment, theme: Theme) -> &'static str {
    select(sentiment, theme).map_or(GENERIC_OFFER, |tool| tool.text)
}
