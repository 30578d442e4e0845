//! The session snapshot piped to us on each statusline tick.
//!
//! The host CLI writes one JSON blob to stdin per invocation. Every field is
//! optional: the host may omit any of them, send nulls, or send nothing at
//! all, and none of that is an error. Unknown fields are ignored so schema
//! additions on the host side never break parsing, and wrong-typed fields
//! degrade individually to their defaults so one bad counter doesn't take
//! the rest of the snapshot down with it.

use std::io::Read;

use serde::{Deserialize, Deserializer};

/// Upper bound on stdin bytes we will consume. The snapshot is a few hundred
/// bytes in practice; the cap keeps a misbehaving host from stalling us.
const MAX_STDIN_BYTES: u64 = 64 * 1024;

/// Accepts the expected type, null, or anything else: a wrong-typed value
/// degrades to None for that one field instead of rejecting the whole
/// snapshot, so a host bug in one counter can't discard the session id.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// One session snapshot as delivered by the host.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct StatusInput {
    #[serde(default, deserialize_with = "lenient")]
    pub session_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub model: Option<ModelInfo>,
    #[serde(default, deserialize_with = "lenient")]
    pub workspace: Option<WorkspaceInfo>,
    #[serde(default, deserialize_with = "lenient")]
    pub cost: Option<CostInfo>,
    #[serde(default, deserialize_with = "lenient")]
    pub context: Option<ContextInfo>,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct ModelInfo {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct WorkspaceInfo {
    #[serde(default, deserialize_with = "lenient")]
    pub current_dir: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub project_dir: Option<String>,
}

/// Accumulated cost and activity counters for the session so far.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct CostInfo {
    #[serde(default, deserialize_with = "lenient")]
    pub total_cost_usd: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub total_duration_ms: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub total_api_duration_ms: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub total_lines_added: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub total_lines_removed: Option<u64>,
}

/// Token counters and context-window size.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct ContextInfo {
    #[serde(default, deserialize_with = "lenient")]
    pub total_input_tokens: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub total_output_tokens: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub current_usage_tokens: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub context_window_size: Option<u64>,
}

impl StatusInput {
    /// Reads and parses one snapshot from stdin.
    ///
    /// Empty or malformed input degrades to `StatusInput::default()`; a
    /// status line must never abort the host session over bad input.
    pub fn from_stdin() -> Self {
        let mut buf = Vec::with_capacity(4096);
        let _ = std::io::stdin()
            .lock()
            .take(MAX_STDIN_BYTES)
            .read_to_end(&mut buf);
        Self::from_bytes(&buf)
    }

    /// Parses a snapshot from raw bytes, degrading to defaults on failure.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            return StatusInput::default();
        }
        match serde_json::from_slice(bytes) {
            Ok(input) => input,
            Err(e) => {
                tracing::debug!(error = %e, "Malformed snapshot on stdin, using defaults");
                StatusInput::default()
            }
        }
    }

    /// Model label for display and pricing lookup, if any was sent.
    pub fn model_label(&self) -> Option<&str> {
        let model = self.model.as_ref()?;
        model
            .display_name
            .as_deref()
            .or(model.id.as_deref())
            .filter(|s| !s.is_empty())
    }
}
