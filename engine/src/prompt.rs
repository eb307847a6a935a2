//! Generation prompt for a companion reply.

use embrace_types::Classification;

const PERSONA: &str = "You are Embrace AI — a warm, empathetic mental wellness companion.";

const RULES: &str = "\
RULES:
• Be supportive, non-clinical, and gentle.
• Keep responses short (3–6 lines max).
• Consider emotional memory.
• Offer tools when helpful (breathing, grounding, journaling, motivation).
• Avoid medical advice.
• NEVER suggest harmful actions.";

const CLOSING: &str = "Respond with empathy and clarity, and offer help if appropriate.";

/// Assemble the reply prompt from the memory transcript, the raw message and its labels.
#[must_use]
pub fn build_reply_prompt(transcript: &str, message: &str, labels: Classification) -> String {
    format!(
        "{PERSONA}\n\n{RULES}\n\nMEMORY:\n{transcript}\n\n\
         User message: \"{message}\"\n\
         Sentiment: {sentiment}\n\
         Theme: {theme}\n\n\
         {CLOSING}",
        sentiment = labels.sentiment,
        theme = labels.theme,
    )
}
