mod bars;
mod ingest;
mod stats;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<(), CliError> {
    match &cli.command {
        Command::Ingest(args) => ingest::run(cli, args).await,
        Command::Stats => stats::run(cli),
        Command::Bars(args) => bars::run(cli, args),
    }
}
