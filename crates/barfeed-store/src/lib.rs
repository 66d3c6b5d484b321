//! DuckDB-backed bar store.
//!
//! One connection per run, single writer. The `bars` table is keyed by
//! `(symbol, ts, interval_type)` and inserts are idempotent: a duplicate key
//! is silently absorbed, never overwritten.

pub mod migrations;

use std::fs;
use std::path::{Path, PathBuf};

use ::duckdb::{params, Connection};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    DuckDb(#[from] ::duckdb::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub db_path: PathBuf,
}

/// Row shape handed to and read back from the `bars` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarRecord {
    pub symbol: String,
    pub ts: String,
    pub interval: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
    pub source: String,
}

/// Outcome of one upsert pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpsertReport {
    /// Rows newly inserted.
    pub inserted: usize,
    /// Rows absorbed as duplicates of an existing key.
    pub skipped: usize,
    /// Row-level failures, recorded and skipped.
    pub failed: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub total_bars: i64,
    pub distinct_symbols: i64,
    pub last_inserted_at: Option<String>,
}

/// One per-symbol run outcome appended to `ingest_log`.
#[derive(Debug, Clone)]
pub struct IngestLogEntry {
    pub symbol: String,
    pub interval: String,
    pub source: String,
    pub status: String,
    pub bars_inserted: i64,
    pub bars_rejected: i64,
    pub detail: Option<String>,
}

pub struct Store {
    connection: Connection,
    db_path: PathBuf,
}

impl Store {
    /// Open (creating if needed) the store at the configured path and apply
    /// pending migrations. Failure here is fatal for the run.
    pub fn open(config: StoreConfig) -> Result<Self, StoreError> {
        if let Some(parent) = config.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let connection = Connection::open(&config.db_path)?;
        connection.execute_batch("PRAGMA disable_progress_bar;")?;
        migrations::apply_migrations(&connection)?;

        Ok(Self {
            connection,
            db_path: config.db_path,
        })
    }

    pub fn db_path(&self) -> &Path {
        self.db_path.as_path()
    }

    /// Insert bars with insert-or-ignore semantics.
    ///
    /// Calling this twice with the same input inserts zero rows the second
    /// time. A row-level failure is recorded in the report and does not
    /// abort the rest of the batch.
    pub fn upsert(&self, bars: &[BarRecord]) -> Result<UpsertReport, StoreError> {
        let mut statement = self.connection.prepare(
            "INSERT OR IGNORE INTO bars \
             (symbol, ts, interval_type, open, high, low, close, volume, source) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )?;

        let mut report = UpsertReport::default();
        for bar in bars {
            let result = statement.execute(params![
                bar.symbol,
                bar.ts,
                bar.interval,
                bar.open,
                bar.high,
                bar.low,
                bar.close,
                bar.volume,
                bar.source,
            ]);
            match result {
                Ok(changed) if changed > 0 => report.inserted += 1,
                Ok(_) => report.skipped += 1,
                Err(error) => {
                    report
                        .failed
                        .push(format!("{} {} {}: {error}", bar.symbol, bar.ts, bar.interval));
                }
            }
        }

        Ok(report)
    }

    pub fn stats(&self) -> Result<StoreStats, StoreError> {
        self.connection.query_row(
            "SELECT COUNT(*), COUNT(DISTINCT symbol), CAST(MAX(inserted_at) AS VARCHAR) FROM bars",
            [],
            |row| {
                Ok(StoreStats {
                    total_bars: row.get(0)?,
                    distinct_symbols: row.get(1)?,
                    last_inserted_at: row.get(2)?,
                })
            },
        )
        .map_err(StoreError::from)
    }

    /// Most recent bars for a symbol/interval, newest first.
    pub fn recent_bars(
        &self,
        symbol: &str,
        interval: &str,
        limit: usize,
    ) -> Result<Vec<BarRecord>, StoreError> {
        let mut statement = self.connection.prepare(
            "SELECT symbol, CAST(ts AS VARCHAR), interval_type, open, high, low, close, volume, source \
             FROM bars WHERE symbol = ? AND interval_type = ? \
             ORDER BY ts DESC LIMIT ?",
        )?;

        let rows = statement.query_map(params![symbol, interval, limit as i64], |row| {
            Ok(BarRecord {
                symbol: row.get(0)?,
                ts: row.get(1)?,
                interval: row.get(2)?,
                open: row.get(3)?,
                high: row.get(4)?,
                low: row.get(5)?,
                close: row.get(6)?,
                volume: row.get(7)?,
                source: row.get::<_, Option<String>>(8)?.unwrap_or_default(),
            })
        })?;

        let mut bars = Vec::new();
        for row in rows {
            bars.push(row?);
        }
        Ok(bars)
    }

    pub fn log_ingest(&self, entry: &IngestLogEntry) -> Result<(), StoreError> {
        self.connection.execute(
            "INSERT INTO ingest_log \
             (symbol, interval_type, source, status, bars_inserted, bars_rejected, detail) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                entry.symbol,
                entry.interval,
                entry.source,
                entry.status,
                entry.bars_inserted,
                entry.bars_rejected,
                entry.detail,
            ],
        )?;
        Ok(())
    }
}
