//! Conversation context for a companion session.
//!
//! This crate provides:
//! - [`ConversationMemory`]: the bounded rolling buffer that feeds prompt context
//! - [`TurnJournal`]: an append-only SQLite log of every remembered turn
//!
//! # Architecture
//!
//! ```text
//! Session
//! ├── memory: ConversationMemory (last 6 turns, FIFO eviction)
//! └── journal: TurnJournal (optional, shared, best-effort)
//! ```

mod memory;
mod sqlite_security;
mod turn_journal;

pub use memory::ConversationMemory;
pub use turn_journal::{JournalEntry, TurnJournal};
