//! Normalizes one incoming snapshot into a store entry.
//!
//! Pure transform, no I/O. Missing or null fields degrade to zero defaults
//! rather than failing the invocation. A snapshot without a session id
//! normalizes to the [`UNKNOWN_SESSION`] sentinel; such records are rendered
//! but never persisted, so unidentifiable sessions can't pollute the
//! aggregates.

use crate::input::StatusInput;
use crate::pricing;
use crate::store::UsageRecord;

/// Sentinel session id for snapshots that arrived without one.
pub const UNKNOWN_SESSION: &str = "unknown";

impl UsageRecord {
    /// Whether this record belongs to an identifiable session and may be
    /// persisted.
    pub fn is_identified(&self) -> bool {
        self.session_id != UNKNOWN_SESSION
    }
}

/// Builds a [`UsageRecord`] from a snapshot, stamping it with `now` (seconds
/// since epoch).
///
/// If the host reported no cost (absent or exactly zero) but did report
/// token counts, the cost falls back to the fixed per-model estimate.
pub fn normalize(input: &StatusInput, now: i64) -> UsageRecord {
    let session_id = input
        .session_id
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_SESSION)
        .to_string();

    let model = input.model_label().unwrap_or_default().to_string();

    let project_dir = input
        .workspace
        .as_ref()
        .and_then(|w| w.project_dir.as_deref().or(w.current_dir.as_deref()))
        .unwrap_or_default()
        .to_string();

    let cost_info = input.cost.as_ref();
    let context = input.context.as_ref();

    let input_tokens = context.and_then(|c| c.total_input_tokens).unwrap_or(0);
    let output_tokens = context.and_then(|c| c.total_output_tokens).unwrap_or(0);

    let reported_cost = cost_info.and_then(|c| c.total_cost_usd).unwrap_or(0.0);
    let cost = if reported_cost == 0.0 && (input_tokens > 0 || output_tokens > 0) {
        pricing::estimate_cost(&model, input_tokens, output_tokens)
    } else {
        reported_cost
    };

    UsageRecord {
        session_id,
        timestamp: now,
        model,
        project_dir,
        cost,
        duration_ms: cost_info.and_then(|c| c.total_duration_ms).unwrap_or(0),
        api_duration_ms: cost_info.and_then(|c| c.total_api_duration_ms).unwrap_or(0),
        input_tokens,
        output_tokens,
        lines_added: cost_info.and_then(|c| c.total_lines_added).unwrap_or(0),
        lines_removed: cost_info.and_then(|c| c.total_lines_removed).unwrap_or(0),
    }
}
