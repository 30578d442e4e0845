//! End-to-end pipeline tests: snapshot bytes in, aggregate totals out,
//! exercised across simulated invocations sharing one storage root.

use statline_core::{
    aggregate, normalize, DebounceGate, FsScratch, StatusInput, StorageConfig, UsageStore,
    WEEK_SECS,
};

/// One simulated statusline tick over a shared storage root.
fn tick(config: &StorageConfig, snapshot: &[u8], now: i64) -> (f64, f64, f64) {
    let input = StatusInput::from_bytes(snapshot);
    let record = normalize(&input, now);

    let mut store = UsageStore::open(&config.usage_file(), &config.usage_backup_file());
    let mut gate = DebounceGate::new(FsScratch::new(config.scratch_dir()));

    if record.is_identified() && gate.should_persist(&record) {
        store.upsert(record.clone()).unwrap();
    }

    let totals = aggregate(&store, &record.session_id, now);
    (record.cost, totals.weekly, totals.lifetime)
}

#[test]
fn totals_accumulate_across_sessions() {
    let temp = tempfile::tempdir().unwrap();
    let config = StorageConfig::with_root(temp.path().to_path_buf());
    config.ensure_dirs().unwrap();

    let now = 1_700_000_000;
    let s1 = br#"{"session_id":"s1","cost":{"total_cost_usd":2.0}}"#;
    let s2 = br#"{"session_id":"s2","cost":{"total_cost_usd":3.0}}"#;

    let (cost, weekly, lifetime) = tick(&config, s1, now);
    assert_eq!(cost, 2.0);
    // First ever session: history holds nothing but itself, which is excluded.
    assert_eq!(weekly, 0.0);
    assert_eq!(lifetime, 0.0);

    let (cost, weekly, lifetime) = tick(&config, s2, now + 10);
    assert_eq!(cost, 3.0);
    assert_eq!(weekly, 2.0);
    assert_eq!(lifetime, 2.0);
}

#[test]
fn debounced_tick_performs_no_store_write() {
    let temp = tempfile::tempdir().unwrap();
    let config = StorageConfig::with_root(temp.path().to_path_buf());
    config.ensure_dirs().unwrap();

    let snapshot = br#"{"session_id":"s1","cost":{"total_cost_usd":1.0}}"#;
    tick(&config, snapshot, 1000);

    // The first save found no pre-existing primary, so no backup was made.
    // A second save would mirror the now-valid primary to the backup, which
    // makes the backup file a direct witness for "a write happened".
    assert!(!config.usage_backup_file().exists());

    tick(&config, snapshot, 1001);
    assert!(
        !config.usage_backup_file().exists(),
        "identical fingerprint must not trigger a second store write"
    );

    let changed = br#"{"session_id":"s1","cost":{"total_cost_usd":1.5}}"#;
    tick(&config, changed, 1002);
    assert!(
        config.usage_backup_file().exists(),
        "changed cost must trigger a second store write"
    );
}

#[test]
fn unknown_sessions_never_reach_the_store() {
    let temp = tempfile::tempdir().unwrap();
    let config = StorageConfig::with_root(temp.path().to_path_buf());
    config.ensure_dirs().unwrap();

    tick(&config, br#"{"cost":{"total_cost_usd":9.0}}"#, 1000);
    assert!(!config.usage_file().exists());

    tick(&config, br#"{"session_id":"s1","cost":{"total_cost_usd":1.0}}"#, 1001);
    let store = UsageStore::open(&config.usage_file(), &config.usage_backup_file());
    assert_eq!(store.len(), 1);
    assert!(store.get("unknown").is_none());
}

#[test]
fn corrupt_history_recovers_and_keeps_aggregating() {
    let temp = tempfile::tempdir().unwrap();
    let config = StorageConfig::with_root(temp.path().to_path_buf());
    config.ensure_dirs().unwrap();

    let now = 1_700_000_000;
    tick(&config, br#"{"session_id":"s1","cost":{"total_cost_usd":2.0}}"#, now);
    tick(&config, br#"{"session_id":"s2","cost":{"total_cost_usd":3.0}}"#, now + 10);

    // Clobber the primary mid-flight; backup holds the s1-only generation.
    std::fs::write(config.usage_file(), "{half a docum").unwrap();

    let (_, weekly, lifetime) = tick(
        &config,
        br#"{"session_id":"s3","cost":{"total_cost_usd":4.0}}"#,
        now + 20,
    );
    assert_eq!(weekly, 2.0);
    assert_eq!(lifetime, 2.0);
}

#[test]
fn old_sessions_age_out_of_the_weekly_total() {
    let temp = tempfile::tempdir().unwrap();
    let config = StorageConfig::with_root(temp.path().to_path_buf());
    config.ensure_dirs().unwrap();

    let now = 1_700_000_000;
    tick(&config, br#"{"session_id":"old","cost":{"total_cost_usd":5.0}}"#, now - WEEK_SECS - 60);
    tick(&config, br#"{"session_id":"new","cost":{"total_cost_usd":1.0}}"#, now - 60);

    let (_, weekly, lifetime) = tick(
        &config,
        br#"{"session_id":"current","cost":{"total_cost_usd":0.1}}"#,
        now,
    );
    assert_eq!(weekly, 1.0);
    assert_eq!(lifetime, 6.0);
}
