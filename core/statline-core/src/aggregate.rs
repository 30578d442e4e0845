//! Rolling-window cost totals over the usage history.
//!
//! Recomputed from scratch on every invocation. Record counts stay small
//! enough that correctness beats caching here.

use crate::store::UsageStore;

/// Seconds in the weekly window (7 x 24h).
pub const WEEK_SECS: i64 = 7 * 24 * 60 * 60;

/// Derived cost totals, exclusive of the in-flight session.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Totals {
    pub weekly: f64,
    pub lifetime: f64,
}

/// Sums stored costs, excluding `current_session_id`.
///
/// The in-flight session's own cost is added back by the caller from the
/// live snapshot, never from a possibly-stale stored copy, so it counts
/// exactly once. `weekly` covers records with `timestamp > now - WEEK_SECS`;
/// `lifetime` covers everything else remaining.
pub fn aggregate(store: &UsageStore, current_session_id: &str, now: i64) -> Totals {
    let cutoff = now - WEEK_SECS;
    let mut totals = Totals::default();

    for record in store.records() {
        if record.session_id == current_session_id {
            continue;
        }
        totals.lifetime += record.cost;
        if record.timestamp > cutoff {
            totals.weekly += record.cost;
        }
    }

    totals
}
