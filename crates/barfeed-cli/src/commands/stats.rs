use barfeed_store::{Store, StoreConfig};

use crate::cli::Cli;
use crate::config::resolve_db_path;
use crate::error::CliError;

pub fn run(cli: &Cli) -> Result<(), CliError> {
    let store = Store::open(StoreConfig {
        db_path: resolve_db_path(cli),
    })?;

    let stats = store.stats()?;
    println!("database:        {}", store.db_path().display());
    println!("total bars:      {}", stats.total_bars);
    println!("unique symbols:  {}", stats.distinct_symbols);
    println!(
        "last insert:     {}",
        stats.last_inserted_at.as_deref().unwrap_or("never")
    );
    Ok(())
}
