//! Store durability across process lifetimes.

use barfeed_store::{BarRecord, Store, StoreConfig};
use tempfile::tempdir;

fn record(symbol: &str, day: u8) -> BarRecord {
    BarRecord {
        symbol: symbol.to_owned(),
        ts: format!("2024-01-{day:02}T00:00:00Z"),
        interval: String::from("1d"),
        open: 100.0,
        high: 102.0,
        low: 99.0,
        close: 101.0,
        volume: 1_000,
        source: String::from("yahoo"),
    }
}

#[test]
fn keys_stay_unique_across_reopened_stores() {
    let dir = tempdir().expect("tempdir");
    let db_path = dir.path().join("bars.duckdb");

    let batch: Vec<BarRecord> = (1..=5).map(|day| record("AAPL", day)).collect();

    {
        let store = Store::open(StoreConfig {
            db_path: db_path.clone(),
        })
        .expect("first open");
        let report = store.upsert(&batch).expect("upsert");
        assert_eq!(report.inserted, 5);
    }

    // A later run against the same file absorbs the same keys silently.
    let store = Store::open(StoreConfig { db_path }).expect("second open");
    let report = store.upsert(&batch).expect("upsert");
    assert_eq!(report.inserted, 0);
    assert_eq!(report.skipped, 5);

    let stats = store.stats().expect("stats");
    assert_eq!(stats.total_bars, 5);
}

#[test]
fn reopening_preserves_previously_stored_values() {
    let dir = tempdir().expect("tempdir");
    let db_path = dir.path().join("bars.duckdb");

    {
        let store = Store::open(StoreConfig {
            db_path: db_path.clone(),
        })
        .expect("first open");
        store.upsert(&[record("MSFT", 1)]).expect("upsert");
    }

    let store = Store::open(StoreConfig { db_path }).expect("second open");
    let bars = store.recent_bars("MSFT", "1d", 10).expect("recent");
    assert_eq!(bars.len(), 1);
    assert_eq!(bars[0].close, 101.0);
    assert_eq!(bars[0].source, "yahoo");
}
