//! statline: prints one status summary line per invocation.
//!
//! The host CLI pipes a JSON session snapshot to stdin every few hundred
//! milliseconds and renders whatever we print to stdout as the statusline.
//! We normalize the snapshot, persist it into the usage history, and print
//! the current session cost alongside weekly/lifetime totals.
//!
//! Exit code is always 0 and stdout always carries exactly one line: a
//! statusline that errors out disrupts the host session, so every failure
//! path degrades to whatever values are still available. Diagnostics go to
//! a log file under the data directory, never to stdout.

mod branch;
mod logging;
mod render;

use std::path::PathBuf;

use clap::Parser;
use statline_core::{
    aggregate, normalize, DebounceGate, FsScratch, StatusInput, StorageConfig, Totals, UsageStore,
};

use render::LineOptions;

#[derive(Parser)]
#[command(name = "statline")]
#[command(about = "Usage summary line for coding-assistant statusline ticks")]
#[command(version)]
struct Cli {
    /// Separator between line segments
    #[arg(long, default_value = " | ")]
    separator: String,

    /// Hide the weekly/lifetime cost totals
    #[arg(long)]
    no_totals: bool,

    /// Hide the git branch segment
    #[arg(long)]
    no_branch: bool,

    /// Hide the session duration segment
    #[arg(long)]
    no_duration: bool,

    /// Override the data directory (default: ~/.statline)
    #[arg(long, value_name = "DIR")]
    store_dir: Option<PathBuf>,

    /// Prune the usage history to the most recent N records before
    /// aggregating (off by default; history grows without bound otherwise)
    #[arg(long, value_name = "N")]
    prune: Option<usize>,
}

fn main() {
    let cli = Cli::parse();

    let config = match &cli.store_dir {
        Some(dir) => StorageConfig::with_root(dir.clone()),
        None => StorageConfig::default(),
    };

    let _logging_guard = logging::init(&config);

    let line = run(&cli, &config);
    println!("{}", line);
}

fn run(cli: &Cli, config: &StorageConfig) -> String {
    if let Err(e) = config.ensure_dirs() {
        tracing::warn!(error = %e, "Failed to create data directories");
    }

    let input = StatusInput::from_stdin();
    let now = chrono::Utc::now().timestamp();
    let record = normalize(&input, now);

    let mut store = UsageStore::open(&config.usage_file(), &config.usage_backup_file());

    if record.is_identified() {
        let mut gate = DebounceGate::new(FsScratch::new(config.scratch_dir()));
        if gate.should_persist(&record) {
            if let Err(e) = store.upsert(record.clone()) {
                tracing::warn!(error = %e, "Failed to persist usage record");
            }
        }
    } else {
        tracing::debug!("Snapshot carries no session id, skipping persistence");
    }

    apply_prune(&mut store, cli.prune);

    let totals = if cli.no_totals {
        Totals::default()
    } else {
        aggregate(&store, &record.session_id, now)
    };

    let branch = if cli.no_branch {
        None
    } else {
        branch::current_branch(&record.project_dir)
    };

    let options = LineOptions {
        separator: cli.separator.clone(),
        show_totals: !cli.no_totals,
        show_duration: !cli.no_duration,
    };
    render::line(&record, branch.as_deref(), &totals, &options)
}

/// Runs retention maintenance when `--prune` was given. Failures are logged
/// and the invocation carries on with the unpruned history.
fn apply_prune(store: &mut UsageStore, keep: Option<usize>) {
    let Some(keep) = keep else {
        return;
    };
    match store.prune(keep) {
        Ok(removed) if removed > 0 => {
            tracing::info!(removed, keep, "Pruned usage history");
        }
        Ok(_) => {}
        Err(e) => tracing::warn!(error = %e, "Failed to prune usage history"),
    }
}
