//! Storage configuration and path management for statline.
//!
//! Centralizes every file path the tool touches. Production code uses
//! `StorageConfig::default()` which points at `~/.statline/`; tests inject a
//! temp directory via `StorageConfig::with_root()`.

use std::path::{Path, PathBuf};

/// Central configuration for all statline storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Root directory for all statline data (default: ~/.statline)
    root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/tmp"));
        Self {
            root: home.join(".statline"),
        }
    }
}

impl StorageConfig {
    /// Creates a StorageConfig with a custom root directory.
    /// Used for testing with temp directories and for `--store-dir`.
    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    /// Returns the root directory for statline data.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to usage.json (the durable usage history document).
    pub fn usage_file(&self) -> PathBuf {
        self.root.join("usage.json")
    }

    /// Path to usage.json.bak (last known-good copy of the primary).
    pub fn usage_backup_file(&self) -> PathBuf {
        self.root.join("usage.json.bak")
    }

    /// Path to scratch/ (ephemeral cross-invocation state: debounce
    /// fingerprint). Loss of anything under here is harmless.
    pub fn scratch_dir(&self) -> PathBuf {
        self.root.join("scratch")
    }

    /// Path to logs/ (diagnostic output; stdout belongs to the status line).
    pub fn log_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// Ensures the root directory and standard subdirectories exist.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::create_dir_all(self.scratch_dir())?;
        std::fs::create_dir_all(self.log_dir())?;
        Ok(())
    }
}
