use std::time::Duration;

use barfeed_store::{BarRecord, IngestLogEntry, Store, StoreError};

use crate::collector::Collector;
use crate::validator::validate_batch;
use crate::{Bar, Interval, ProviderId, Symbol, UtcDateTime};

/// What one run should ingest: which symbols, at which granularity, over
/// which history window.
#[derive(Debug, Clone)]
pub struct IngestPlan {
    pub symbols: Vec<Symbol>,
    pub interval: Interval,
    pub lookback: Duration,
}

/// A symbol that failed terminally after retries were exhausted.
#[derive(Debug, Clone)]
pub struct SymbolFailure {
    pub symbol: Symbol,
    pub error: String,
}

/// Run summary: attempted, inserted, rejected, failed.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub symbols_attempted: usize,
    pub bars_fetched: usize,
    pub bars_inserted: usize,
    pub bars_rejected: usize,
    pub failures: Vec<SymbolFailure>,
}

impl RunReport {
    pub fn symbols_failed(&self) -> usize {
        self.failures.len()
    }
}

/// Process the plan's symbols one at a time: fetch, validate, upsert.
///
/// A symbol's terminal failure is logged and counted, never fatal to the
/// run; only a store failure propagates and terminates the run.
pub async fn run_ingestion(
    plan: &IngestPlan,
    collector: &Collector,
    store: &Store,
) -> Result<RunReport, StoreError> {
    let source = collector.source_id();
    let mut report = RunReport::default();

    for symbol in &plan.symbols {
        report.symbols_attempted += 1;

        let raws = match collector.fetch(symbol, plan.interval, plan.lookback).await {
            Ok(raws) => raws,
            Err(error) => {
                tracing::error!(
                    symbol = %symbol,
                    interval = %plan.interval,
                    %error,
                    "collection failed, skipping symbol"
                );
                store.log_ingest(&IngestLogEntry {
                    symbol: symbol.as_str().to_owned(),
                    interval: plan.interval.as_str().to_owned(),
                    source: source.as_str().to_owned(),
                    status: String::from("failed"),
                    bars_inserted: 0,
                    bars_rejected: 0,
                    detail: Some(error.to_string()),
                })?;
                report.failures.push(SymbolFailure {
                    symbol: symbol.clone(),
                    error: error.to_string(),
                });
                continue;
            }
        };

        report.bars_fetched += raws.len();
        let outcome = validate_batch(symbol, plan.interval, &raws, UtcDateTime::now());
        for rejected in &outcome.rejected {
            tracing::warn!(
                symbol = %symbol,
                interval = %plan.interval,
                ts = %rejected.ts,
                reason = %rejected.reason,
                "bar rejected"
            );
        }
        for warning in &outcome.warnings {
            tracing::warn!(symbol = %symbol, "{warning}");
        }

        let records: Vec<BarRecord> = outcome
            .accepted
            .iter()
            .map(|bar| to_record(bar, source))
            .collect();
        let upsert = store.upsert(&records)?;
        for failure in &upsert.failed {
            tracing::warn!(symbol = %symbol, "row insert failed: {failure}");
        }

        tracing::info!(
            symbol = %symbol,
            interval = %plan.interval,
            fetched = raws.len(),
            inserted = upsert.inserted,
            duplicates = upsert.skipped,
            rejected = outcome.rejected.len(),
            "symbol ingested"
        );

        report.bars_inserted += upsert.inserted;
        report.bars_rejected += outcome.rejected.len();

        store.log_ingest(&IngestLogEntry {
            symbol: symbol.as_str().to_owned(),
            interval: plan.interval.as_str().to_owned(),
            source: source.as_str().to_owned(),
            status: String::from("ok"),
            bars_inserted: upsert.inserted as i64,
            bars_rejected: outcome.rejected.len() as i64,
            detail: None,
        })?;
    }

    Ok(report)
}

fn to_record(bar: &Bar, source: ProviderId) -> BarRecord {
    BarRecord {
        symbol: bar.symbol.as_str().to_owned(),
        ts: bar.ts.format_rfc3339(),
        interval: bar.interval.as_str().to_owned(),
        open: bar.open,
        high: bar.high,
        low: bar.low,
        close: bar.close,
        volume: bar.volume.min(i64::MAX as u64) as i64,
        source: source.as_str().to_owned(),
    }
}
