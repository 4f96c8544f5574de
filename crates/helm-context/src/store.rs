//! Read access to each session's state-entry log.
//!
//! The log is written by the host application; the orchestrator only reads
//! it. Both backends expose an `append` helper for hosts and tests that play
//! the writer role.

use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};

use dashmap::DashMap;
use tracing::warn;

use helm_core::errors::{StoreError, StoreResult};
use helm_core::ids::SessionId;
use helm_core::state::StateEntry;

/// Session-keyed, append-only state-entry log.
pub trait ContextStore: Send + Sync {
    /// All entries for `session`, oldest first. A session without a log has
    /// no entries.
    fn entries(&self, session: &SessionId) -> StoreResult<Vec<StateEntry>>;
}

// ─────────────────────────────────────────────────────────────────────────────
// In-memory
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory log per session.
#[derive(Default)]
pub struct MemoryContextStore {
    logs: DashMap<SessionId, Vec<StateEntry>>,
}

impl MemoryContextStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry to a session's log.
    pub fn append(&self, session: &SessionId, entry: StateEntry) {
        self.logs.entry(session.clone()).or_default().push(entry);
    }
}

impl ContextStore for MemoryContextStore {
    fn entries(&self, session: &SessionId) -> StoreResult<Vec<StateEntry>> {
        Ok(self
            .logs
            .get(session)
            .map(|log| log.value().clone())
            .unwrap_or_default())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// JSON lines on disk
// ─────────────────────────────────────────────────────────────────────────────

/// One `<session>.jsonl` file per session under a directory.
#[derive(Clone, Debug)]
pub struct FileContextStore {
    dir: PathBuf,
}

impl FileContextStore {
    /// Store rooted at `dir`. The directory is created on first append.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, session: &SessionId) -> StoreResult<PathBuf> {
        if !session.is_path_safe() {
            return Err(StoreError::InvalidKey(session.to_string()));
        }
        Ok(self.dir.join(format!("{session}.jsonl")))
    }

    /// Append one entry as a JSON line.
    pub fn append(&self, session: &SessionId, entry: &StateEntry) -> StoreResult<()> {
        let path = self.path_for(session)?;
        fs::create_dir_all(&self.dir)?;
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}

impl ContextStore for FileContextStore {
    fn entries(&self, session: &SessionId) -> StoreResult<Vec<StateEntry>> {
        let path = self.path_for(session)?;
        let file = match fs::File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        for (lineno, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<StateEntry>(&line) {
                Ok(entry) => entries.push(entry),
                Err(error) => warn!(
                    session_id = %session,
                    line = lineno + 1,
                    error = %error,
                    "skipping malformed state entry"
                ),
            }
        }
        Ok(entries)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
