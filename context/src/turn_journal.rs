// Turn Journal - append-only log of remembered conversation turns
//
// Every turn that enters a session's memory is also written here, keyed by
// session id and per-session sequence number. Rows are never updated.
// Classification labels are not stored.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use std::path::Path;

use embrace_types::{Role, Turn};

use crate::sqlite_security::prepare_db_path;

/// A journaled turn read back from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    pub seq: u64,
    pub role: Role,
    pub text: String,
    pub recorded_at: DateTime<Utc>,
}

/// SQLite-backed turn log.
pub struct TurnJournal {
    db: Connection,
}

impl std::fmt::Debug for TurnJournal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnJournal")
            .field("path", &self.db.path())
            .finish_non_exhaustive()
    }
}

impl TurnJournal {
    const SCHEMA: &'static str = r"
        CREATE TABLE IF NOT EXISTS turns (
            session_id TEXT NOT NULL,
            seq INTEGER NOT NULL,
            role TEXT NOT NULL,
            text TEXT NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (session_id, seq)
        );

        CREATE INDEX IF NOT EXISTS idx_turns_created
        ON turns(created_at);
    ";

    /// Open or create the journal database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        prepare_db_path(path)?;

        let db = Connection::open(path)
            .with_context(|| format!("Failed to open turn journal at {}", path.display()))?;
        tracing::debug!(path = %path.display(), "Turn journal opened");
        Self::initialize(db)
    }

    /// Open an in-memory journal (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let db = Connection::open_in_memory().context("Failed to open in-memory turn journal")?;
        Self::initialize(db)
    }

    fn initialize(db: Connection) -> Result<Self> {
        db.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
            .context("Failed to set turn journal pragmas")?;
        db.execute_batch(Self::SCHEMA)
            .context("Failed to create turn journal schema")?;
        Ok(Self { db })
    }

    /// Append one turn. Sequence numbers are per session and must be unique.
    pub fn append(&self, session_id: &str, seq: u64, turn: &Turn) -> Result<()> {
        let created_at = Utc::now().to_rfc3339();
        self.db
            .execute(
                "INSERT INTO turns (session_id, seq, role, text, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    session_id,
                    seq as i64,
                    turn.role().as_str(),
                    turn.text(),
                    created_at,
                ],
            )
            .with_context(|| format!("Failed to append turn {seq} for session {session_id}"))?;
        Ok(())
    }

    /// All turns of one session in sequence order.
    pub fn session_turns(&self, session_id: &str) -> Result<Vec<JournalEntry>> {
        let mut stmt = self
            .db
            .prepare(
                "SELECT seq, role, text, created_at
                 FROM turns WHERE session_id = ?1 ORDER BY seq",
            )
            .context("Failed to prepare session turn query")?;

        let rows = stmt
            .query_map(params![session_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .context("Failed to query session turns")?;

        let mut entries = Vec::new();
        for row in rows {
            let (seq, role, text, created_at) = row.context("Failed to read turn row")?;
            let role = Role::parse(&role)
                .with_context(|| format!("Unknown role '{role}' in turn {seq}"))?;
            let recorded_at = DateTime::parse_from_rfc3339(&created_at)
                .with_context(|| format!("Invalid timestamp in turn {seq}"))?
                .with_timezone(&Utc);
            entries.push(JournalEntry {
                seq: seq as u64,
                role,
                text,
                recorded_at,
            });
        }
        Ok(entries)
    }
}
