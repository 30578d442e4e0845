//! Skips redundant store writes between ticks.
//!
//! The host re-invokes us every few hundred milliseconds, but session totals
//! change far less often. The gate compares a small fingerprint of the
//! incoming record against the one saved by the last persisted write and
//! short-circuits the upsert when nothing material changed.
//!
//! The fingerprint lives in scratch storage behind the [`ScratchStore`]
//! trait, so the gate is testable without touching the real filesystem.
//! Scratch state is best-effort: losing it costs one extra write, never
//! data, and any read/write failure defaults to "persist".

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::store::UsageRecord;

const FINGERPRINT_KEY: &str = "last-write";

/// Minimal key-value scratch storage for ephemeral cross-invocation state.
pub trait ScratchStore {
    fn get(&self, key: &str) -> Option<String>;
    /// Best effort; failures are swallowed by implementations.
    fn put(&mut self, key: &str, value: &str);
}

/// Scratch backend with one file per key under a directory.
pub struct FsScratch {
    dir: PathBuf,
}

impl FsScratch {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl ScratchStore for FsScratch {
    fn get(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.key_path(key)).ok()
    }

    fn put(&mut self, key: &str, value: &str) {
        if let Err(e) = std::fs::create_dir_all(&self.dir)
            .and_then(|_| std::fs::write(self.key_path(key), value))
        {
            tracing::debug!(key, error = %e, "Failed to write scratch state");
        }
    }
}

/// In-memory scratch backend for tests.
#[derive(Default)]
pub struct MemScratch {
    map: HashMap<String, String>,
}

impl MemScratch {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScratchStore for MemScratch {
    fn get(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: &str) {
        self.map.insert(key.to_string(), value.to_string());
    }
}

/// The fields whose change warrants a new write. Timestamp is deliberately
/// absent: a tick that changes nothing but the clock is still redundant.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Fingerprint {
    session_id: String,
    cost: f64,
    duration_ms: u64,
    lines_added: u64,
    lines_removed: u64,
}

impl Fingerprint {
    fn of(record: &UsageRecord) -> Self {
        Fingerprint {
            session_id: record.session_id.clone(),
            cost: record.cost,
            duration_ms: record.duration_ms,
            lines_added: record.lines_added,
            lines_removed: record.lines_removed,
        }
    }
}

/// Decides whether an incoming record differs materially from the last
/// persisted one.
pub struct DebounceGate<S: ScratchStore> {
    scratch: S,
}

impl<S: ScratchStore> DebounceGate<S> {
    pub fn new(scratch: S) -> Self {
        Self { scratch }
    }

    /// Returns false when the record's fingerprint matches the stored one
    /// (caller must skip the store write). Otherwise records the new
    /// fingerprint and returns true.
    pub fn should_persist(&mut self, record: &UsageRecord) -> bool {
        let current = Fingerprint::of(record);

        let previous = self
            .scratch
            .get(FINGERPRINT_KEY)
            .and_then(|raw| serde_json::from_str::<Fingerprint>(&raw).ok());

        if previous.as_ref() == Some(&current) {
            return false;
        }

        match serde_json::to_string(&current) {
            Ok(encoded) => self.scratch.put(FINGERPRINT_KEY, &encoded),
            Err(e) => tracing::debug!(error = %e, "Failed to encode fingerprint"),
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, cost: f64, lines_added: u64) -> UsageRecord {
        UsageRecord {
            session_id: id.to_string(),
            timestamp: 1000,
            model: "Opus".to_string(),
            project_dir: "/p".to_string(),
            cost,
            duration_ms: 5000,
            api_duration_ms: 4000,
            input_tokens: 10,
            output_tokens: 20,
            lines_added,
            lines_removed: 0,
        }
    }

    #[test]
    fn test_first_record_persists() {
        let mut gate = DebounceGate::new(MemScratch::new());
        assert!(gate.should_persist(&record("s1", 1.0, 5)));
    }

    #[test]
    fn test_identical_fingerprint_skips_second_write() {
        let mut gate = DebounceGate::new(MemScratch::new());
        assert!(gate.should_persist(&record("s1", 1.0, 5)));
        assert!(!gate.should_persist(&record("s1", 1.0, 5)));
    }

    #[test]
    fn test_timestamp_change_alone_does_not_force_write() {
        let mut gate = DebounceGate::new(MemScratch::new());
        let mut r = record("s1", 1.0, 5);
        assert!(gate.should_persist(&r));
        r.timestamp = 2000;
        assert!(!gate.should_persist(&r));
    }

    #[test]
    fn test_changed_lines_added_forces_write() {
        let mut gate = DebounceGate::new(MemScratch::new());
        assert!(gate.should_persist(&record("s1", 1.0, 5)));
        assert!(gate.should_persist(&record("s1", 1.0, 6)));
        assert!(!gate.should_persist(&record("s1", 1.0, 6)));
    }

    #[test]
    fn test_different_session_forces_write() {
        let mut gate = DebounceGate::new(MemScratch::new());
        assert!(gate.should_persist(&record("s1", 1.0, 5)));
        assert!(gate.should_persist(&record("s2", 1.0, 5)));
    }

    #[test]
    fn test_garbage_scratch_defaults_to_persist() {
        let mut scratch = MemScratch::new();
        scratch.put(FINGERPRINT_KEY, "not a fingerprint");
        let mut gate = DebounceGate::new(scratch);
        assert!(gate.should_persist(&record("s1", 1.0, 5)));
    }

    #[test]
    fn test_fs_scratch_round_trip() {
        let temp = tempfile::tempdir().unwrap();
        let mut gate = DebounceGate::new(FsScratch::new(temp.path().join("scratch")));
        assert!(gate.should_persist(&record("s1", 1.0, 5)));

        // A fresh gate over the same directory sees the saved fingerprint.
        let mut gate = DebounceGate::new(FsScratch::new(temp.path().join("scratch")));
        assert!(!gate.should_persist(&record("s1", 1.0, 5)));
    }

    #[test]
    fn test_fs_scratch_missing_dir_is_nonfatal() {
        let temp = tempfile::tempdir().unwrap();
        let scratch = FsScratch::new(temp.path().join("never-created"));
        assert!(scratch.get(FINGERPRINT_KEY).is_none());
        let mut gate = DebounceGate::new(scratch);
        assert!(gate.should_persist(&record("s1", 1.0, 5)));
    }
}
