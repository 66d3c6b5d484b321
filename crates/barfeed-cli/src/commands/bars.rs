use std::str::FromStr;

use barfeed_core::{Interval, Symbol};
use barfeed_store::{Store, StoreConfig};

use crate::cli::{BarsArgs, Cli};
use crate::config::resolve_db_path;
use crate::error::CliError;

pub fn run(cli: &Cli, args: &BarsArgs) -> Result<(), CliError> {
    if args.limit == 0 {
        return Err(CliError::Config(String::from(
            "--limit must be greater than zero",
        )));
    }

    let symbol = Symbol::parse(&args.symbol)?;
    let interval = Interval::from_str(&args.interval)?;

    let store = Store::open(StoreConfig {
        db_path: resolve_db_path(cli),
    })?;
    let bars = store.recent_bars(symbol.as_str(), interval.as_str(), args.limit)?;

    if bars.is_empty() {
        println!("no bars stored for {symbol} ({interval})");
        return Ok(());
    }

    println!(
        "{:<22} {:>10} {:>10} {:>10} {:>10} {:>12}",
        "ts", "open", "high", "low", "close", "volume"
    );
    for bar in &bars {
        println!(
            "{:<22} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>12}",
            bar.ts, bar.open, bar.high, bar.low, bar.close, bar.volume
        );
    }
    Ok(())
}
