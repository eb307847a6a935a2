//! Bounded rolling buffer of recent turns.

use std::collections::VecDeque;

use embrace_types::Turn;

/// The most recent turns of one session, oldest first.
///
/// Holds at most [`ConversationMemory::CAPACITY`] turns. Appending beyond
/// capacity drops the oldest turn; the rest keep their relative order.
#[derive(Debug, Clone, Default)]
pub struct ConversationMemory {
    turns: VecDeque<Turn>,
}

impl ConversationMemory {
    pub const CAPACITY: usize = 6;

    #[must_use]
    pub fn new() -> Self {
        Self {
            turns: VecDeque::with_capacity(Self::CAPACITY),
        }
    }

    pub fn append(&mut self, turn: Turn) {
        if self.turns.len() == Self::CAPACITY {
            self.turns.pop_front();
        }
        self.turns.push_back(turn);
    }

    /// Owned copy of the buffer in chronological order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.iter().cloned().collect()
    }

    /// `role: text` per line, oldest first. Empty when nothing is remembered.
    #[must_use]
    pub fn transcript(&self) -> String {
        self.turns
            .iter()
            .map(|turn| format!("{}: {}", turn.role(), turn.text()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
