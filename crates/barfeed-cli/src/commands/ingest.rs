use std::sync::Arc;
use std::time::Duration;

use barfeed_core::{
    run_ingestion, Collector, IngestPlan, ReqwestHttpClient, RequestPacer, RetryConfig,
    YahooSource,
};
use barfeed_store::{Store, StoreConfig};

use crate::cli::{Cli, IngestArgs};
use crate::config::RunConfig;
use crate::error::CliError;

// Roughly one provider request per second, matching the source's free tier.
const QUOTA_WINDOW: Duration = Duration::from_secs(60);
const QUOTA_LIMIT: u32 = 60;

pub async fn run(cli: &Cli, args: &IngestArgs) -> Result<(), CliError> {
    let config = RunConfig::load(cli, args)?;

    let store = Store::open(StoreConfig {
        db_path: config.db_path.clone(),
    })?;
    tracing::info!(db_path = %store.db_path().display(), "store opened");

    let source = YahooSource::new(Arc::new(ReqwestHttpClient::new()));
    let collector = Collector::new(
        Arc::new(source),
        RetryConfig::default(),
        RequestPacer::new(QUOTA_WINDOW, QUOTA_LIMIT),
    );

    let plan = IngestPlan {
        symbols: config.symbols,
        interval: config.interval,
        lookback: config.lookback,
    };
    let report = run_ingestion(&plan, &collector, &store).await?;

    println!("symbols attempted: {}", report.symbols_attempted);
    println!("bars inserted:     {}", report.bars_inserted);
    println!("bars rejected:     {}", report.bars_rejected);
    println!("symbols failed:    {}", report.symbols_failed());
    for failure in &report.failures {
        println!("  {}: {}", failure.symbol, failure.error);
    }

    if report.symbols_failed() > 0 {
        return Err(CliError::PartialFailure {
            failed: report.symbols_failed(),
            attempted: report.symbols_attempted,
        });
    }
    Ok(())
}
