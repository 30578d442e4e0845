//! File-only diagnostics. stdout belongs to the status line, so the
//! subscriber writes to a daily-rolled file under the data directory.
//!
//! `STATLINE_LOG=debug` (or any `EnvFilter` directive) raises verbosity;
//! the default is warnings only.

use statline_core::StorageConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILTER_ENV: &str = "STATLINE_LOG";

/// Initializes tracing. Returns a guard that must stay alive for the
/// process lifetime so buffered log lines get flushed; None means logging
/// could not be set up, which is itself non-fatal.
pub fn init(config: &StorageConfig) -> Option<WorkerGuard> {
    let log_dir = config.log_dir();
    if std::fs::create_dir_all(&log_dir).is_err() {
        return None;
    }

    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    let appender = tracing_appender::rolling::daily(log_dir, "statline.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    // A second init (e.g. in tests) fails; ignore it rather than panic.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init();

    Some(guard)
}
