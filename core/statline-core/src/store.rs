//! File-backed usage history persistence.
//!
//! Keeps one record per session in `~/.statline/usage.json` and mirrors the
//! last known-good state to `usage.json.bak`.
//!
//! # File Format
//!
//! ```json
//! {
//!   "version": 1,
//!   "sessions": {
//!     "session-abc": { ... UsageRecord fields ... }
//!   }
//! }
//! ```
//!
//! # Defensive Design
//!
//! The file is shared between short-lived invocations that may overlap, so we
//! handle:
//! - Missing file (empty store, not an error)
//! - Empty or corrupt JSON (recover from backup, else reinitialize)
//! - Unsupported versions (treated like corruption: recover or reinitialize)
//! - Missing fields (serde defaults)
//!
//! # Atomic Writes
//!
//! Every write serializes the full collection to a temp file in the same
//! directory and renames it into place, so a concurrent reader observes
//! either the old complete document or the new one, never a mixture. Two
//! overlapping writers can still lose one of the two updates (last rename
//! wins); that race is accepted, see DESIGN.md.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::{Result, StatlineError};

/// Schema version. We only trust documents with version == 1.
const STORE_VERSION: u32 = 1;

/// One entry per coding session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub session_id: String,
    /// Seconds since epoch, set when the record is normalized for writing.
    pub timestamp: i64,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub project_dir: String,
    /// Session cost in currency units (USD).
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub api_duration_ms: u64,
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
    #[serde(default)]
    pub lines_added: u64,
    #[serde(default)]
    pub lines_removed: u64,
}

/// The on-disk JSON structure for the usage file.
#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    /// Session ID → record map. At most one record per id.
    sessions: HashMap<String, UsageRecord>,
}

impl Default for StoreFile {
    fn default() -> Self {
        StoreFile {
            version: STORE_VERSION,
            sessions: HashMap::new(),
        }
    }
}

/// What we found when reading a store document off disk.
enum LoadOutcome {
    /// File doesn't exist. Normal on first run.
    Missing,
    /// File parsed and carries a supported version.
    Valid(HashMap<String, UsageRecord>),
    /// File exists but is unreadable, unparsable, or the wrong version.
    Corrupt,
}

/// In-memory view of the usage history, optionally backed by files.
///
/// Create with [`UsageStore::open`] to run recovery and read the durable
/// state, or [`UsageStore::new_in_memory`] for tests.
pub struct UsageStore {
    sessions: HashMap<String, UsageRecord>,
    file_path: Option<PathBuf>,
    backup_path: Option<PathBuf>,
}

impl UsageStore {
    pub fn new_in_memory() -> Self {
        UsageStore {
            sessions: HashMap::new(),
            file_path: None,
            backup_path: None,
        }
    }

    fn empty(file_path: &Path, backup_path: &Path) -> Self {
        UsageStore {
            sessions: HashMap::new(),
            file_path: Some(file_path.to_path_buf()),
            backup_path: Some(backup_path.to_path_buf()),
        }
    }

    /// Opens the store, running recovery before anything else.
    ///
    /// State machine: validate primary → [valid: ready] / [invalid: try
    /// backup → [valid: restore primary from backup] / [invalid:
    /// reinitialize empty]] → ready. Never returns an error: the worst
    /// outcome is an empty history.
    pub fn open(file_path: &Path, backup_path: &Path) -> Self {
        match read_document(file_path) {
            LoadOutcome::Valid(sessions) => UsageStore {
                sessions,
                file_path: Some(file_path.to_path_buf()),
                backup_path: Some(backup_path.to_path_buf()),
            },
            LoadOutcome::Missing => Self::empty(file_path, backup_path),
            LoadOutcome::Corrupt => match read_document(backup_path) {
                LoadOutcome::Valid(sessions) => {
                    tracing::warn!(
                        path = %file_path.display(),
                        "Usage file corrupt, restoring from backup"
                    );
                    if let Err(e) = restore_from_backup(file_path, backup_path) {
                        tracing::warn!(error = %e, "Failed to rewrite primary from backup");
                    }
                    UsageStore {
                        sessions,
                        file_path: Some(file_path.to_path_buf()),
                        backup_path: Some(backup_path.to_path_buf()),
                    }
                }
                _ => {
                    tracing::warn!(
                        path = %file_path.display(),
                        "Usage file and backup both unusable, reinitializing empty history"
                    );
                    Self::empty(file_path, backup_path)
                }
            },
        }
    }

    /// Inserts or replaces the record for its session id, then persists the
    /// whole collection atomically. The previous known-good primary is
    /// mirrored to the backup first, so the backup is at most one
    /// generation stale.
    pub fn upsert(&mut self, record: UsageRecord) -> Result<()> {
        self.sessions.insert(record.session_id.clone(), record);
        self.save()
    }

    pub fn get(&self, session_id: &str) -> Option<&UsageRecord> {
        self.sessions.get(session_id)
    }

    pub fn records(&self) -> impl Iterator<Item = &UsageRecord> {
        self.sessions.values()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Retention maintenance: keeps the `keep` most recent records by
    /// timestamp and drops the rest. Returns how many records were removed.
    /// Not called on the render path; exposed for an explicit prune.
    pub fn prune(&mut self, keep: usize) -> Result<usize> {
        if self.sessions.len() <= keep {
            return Ok(0);
        }

        let mut by_age: Vec<(String, i64)> = self
            .sessions
            .iter()
            .map(|(id, r)| (id.clone(), r.timestamp))
            .collect();
        by_age.sort_by_key(|(_, ts)| std::cmp::Reverse(*ts));

        let removed = by_age.len() - keep;
        for (id, _) in by_age.into_iter().skip(keep) {
            self.sessions.remove(&id);
        }
        self.save()?;
        Ok(removed)
    }

    fn save(&self) -> Result<()> {
        // In-memory stores have nothing to persist.
        let Some(file_path) = self.file_path.as_ref() else {
            return Ok(());
        };

        // Mirror the pre-write state before swapping in the new document.
        // Only a primary that still parses is worth keeping as a backup.
        if let Some(backup_path) = &self.backup_path {
            if let LoadOutcome::Valid(_) = read_document(file_path) {
                if let Err(e) = fs::copy(file_path, backup_path) {
                    tracing::warn!(error = %e, "Failed to refresh usage backup");
                }
            }
        }

        let store_file = StoreFile {
            version: STORE_VERSION,
            sessions: self.sessions.clone(),
        };
        let content = serde_json::to_string_pretty(&store_file)
            .map_err(|e| StatlineError::json("serialize usage file", e))?;

        write_atomic(file_path, content.as_bytes())
    }
}

/// Writes `content` to `path` via temp file + rename in the same directory.
fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let parent_dir = path.parent().ok_or_else(|| {
        StatlineError::io(
            "usage file path has no parent directory",
            std::io::Error::from(std::io::ErrorKind::NotFound),
        )
    })?;

    let mut temp_file = NamedTempFile::new_in(parent_dir)
        .map_err(|e| StatlineError::io("create temp usage file", e))?;
    temp_file
        .write_all(content)
        .map_err(|e| StatlineError::io("write temp usage file", e))?;
    temp_file
        .flush()
        .map_err(|e| StatlineError::io("flush temp usage file", e))?;
    temp_file
        .persist(path)
        .map_err(|e| StatlineError::io("rename temp usage file into place", e.error))?;
    Ok(())
}

/// Reads and classifies a store document.
fn read_document(path: &Path) -> LoadOutcome {
    if !path.exists() {
        return LoadOutcome::Missing;
    }

    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read usage file");
            return LoadOutcome::Corrupt;
        }
    };

    if content.trim().is_empty() {
        return LoadOutcome::Corrupt;
    }

    match serde_json::from_str::<StoreFile>(&content) {
        Ok(store_file) if store_file.version == STORE_VERSION => {
            LoadOutcome::Valid(store_file.sessions)
        }
        Ok(store_file) => {
            tracing::warn!(
                path = %path.display(),
                version = store_file.version,
                "Unsupported usage file version"
            );
            LoadOutcome::Corrupt
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to parse usage file");
            LoadOutcome::Corrupt
        }
    }
}

/// Rewrites the primary from the backup's bytes, atomically.
fn restore_from_backup(file_path: &Path, backup_path: &Path) -> Result<()> {
    let content =
        fs::read(backup_path).map_err(|e| StatlineError::io("read usage backup", e))?;
    write_atomic(file_path, &content)
}
