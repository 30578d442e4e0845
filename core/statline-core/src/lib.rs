//! # statline-core
//!
//! Core library for statline, the single-line usage summary printed on every
//! statusline tick of the host coding-assistant CLI.
//!
//! The interesting part is the usage-tracking pipeline: each invocation hands
//! a normalized snapshot to the store, which keeps one record per session in
//! a single JSON document and recomputes weekly/lifetime cost totals from it.
//!
//! ## Design Principles
//!
//! - **Synchronous**: No async runtime. Each invocation is a short-lived
//!   process; everything is bounded local disk I/O.
//! - **Graceful degradation**: Missing files return empty/default values,
//!   corrupt files trigger recovery, malformed input degrades to zeros. The
//!   host session must never see an error from us.
//! - **Atomic persistence**: The usage document is only ever replaced via
//!   temp-file-plus-rename, so concurrent readers observe old-or-new,
//!   never a torn file.
//!
//! ## Pipeline
//!
//! ```rust,ignore
//! let input = StatusInput::from_stdin();
//! let record = ingest::normalize(&input, now);
//! let mut store = UsageStore::open(&paths.usage_file(), &paths.usage_backup_file());
//! if record.is_identified() && gate.should_persist(&record) {
//!     store.upsert(record.clone())?;
//! }
//! let totals = aggregate::aggregate(&store, &record.session_id, now);
//! ```

pub mod aggregate;
pub mod debounce;
pub mod error;
pub mod ingest;
pub mod input;
pub mod pricing;
pub mod storage;
pub mod store;

pub use aggregate::{aggregate, Totals, WEEK_SECS};
pub use debounce::{DebounceGate, FsScratch, MemScratch, ScratchStore};
pub use error::{Result, StatlineError};
pub use ingest::{normalize, UNKNOWN_SESSION};
pub use input::StatusInput;
pub use storage::StorageConfig;
pub use store::{UsageRecord, UsageStore};
