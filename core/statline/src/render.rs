//! Assembles the single output line.
//!
//! Plain text only. Segments that have nothing to show are dropped rather
//! than rendered empty; the cost segment is always present, so the host
//! always gets one non-empty line.

use statline_core::{Totals, UsageRecord};

pub struct LineOptions {
    pub separator: String,
    pub show_totals: bool,
    pub show_duration: bool,
}

impl Default for LineOptions {
    fn default() -> Self {
        Self {
            separator: " | ".to_string(),
            show_totals: true,
            show_duration: true,
        }
    }
}

/// Builds the status line from the normalized record, the derived totals,
/// and the optional branch name.
pub fn line(
    record: &UsageRecord,
    branch: Option<&str>,
    totals: &Totals,
    options: &LineOptions,
) -> String {
    let mut segments: Vec<String> = Vec::with_capacity(6);

    if !record.model.is_empty() {
        segments.push(record.model.clone());
    }

    if let Some(name) = project_name(&record.project_dir) {
        segments.push(name.to_string());
    }

    if let Some(branch) = branch.filter(|b| !b.is_empty()) {
        segments.push(branch.to_string());
    }

    segments.push(format!("${:.2}", record.cost));

    if options.show_duration && record.duration_ms > 0 {
        segments.push(format_duration_ms(record.duration_ms));
    }

    if options.show_totals {
        segments.push(format!("wk ${:.2}", totals.weekly + record.cost));
        segments.push(format!("all ${:.2}", totals.lifetime + record.cost));
    }

    segments.join(&options.separator)
}

/// Last path component of the project directory, if any.
fn project_name(project_dir: &str) -> Option<&str> {
    let trimmed = project_dir.trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    trimmed.rsplit('/').next().filter(|s| !s.is_empty())
}

/// Whole minutes for long sessions, whole seconds under a minute.
fn format_duration_ms(ms: u64) -> String {
    let secs = ms / 1000;
    if secs < 60 {
        format!("{}s", secs)
    } else {
        format!("{}m", secs / 60)
    }
}
