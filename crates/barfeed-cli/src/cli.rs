use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "barfeed", version, about = "Fetch OHLCV bars and store them locally")]
pub struct Cli {
    /// Database file path (overrides BARFEED_DB_PATH).
    #[arg(long, global = true)]
    pub db_path: Option<PathBuf>,

    /// Log everything at debug level.
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch bars for the configured symbols and persist them.
    Ingest(IngestArgs),
    /// Show store-level statistics.
    Stats,
    /// Show the most recent stored bars for one symbol.
    Bars(BarsArgs),
}

#[derive(Debug, Args)]
pub struct IngestArgs {
    /// Comma-separated symbols (overrides BARFEED_SYMBOLS).
    #[arg(long)]
    pub symbols: Option<String>,

    /// Bar interval, e.g. 1d or 1h (overrides BARFEED_INTERVAL).
    #[arg(long)]
    pub interval: Option<String>,

    /// History window, e.g. 30d or 12h (overrides BARFEED_LOOKBACK).
    #[arg(long)]
    pub lookback: Option<String>,
}

#[derive(Debug, Args)]
pub struct BarsArgs {
    /// Symbol to show.
    pub symbol: String,

    /// Bar interval.
    #[arg(long, default_value = "1d")]
    pub interval: String,

    /// Maximum number of bars to print.
    #[arg(long, default_value_t = 10)]
    pub limit: usize,
}
