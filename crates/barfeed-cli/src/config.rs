use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use barfeed_core::{Interval, Symbol};

use crate::cli::{Cli, IngestArgs};
use crate::error::CliError;

const DEFAULT_SYMBOLS: &str = "AAPL,GOOGL";
const DEFAULT_INTERVAL: &str = "1d";
const DEFAULT_LOOKBACK: &str = "30d";
const DEFAULT_DB_PATH: &str = "data/barfeed.duckdb";

/// Immutable per-run configuration, resolved once at startup from the
/// environment and CLI flags. Components receive values from here and never
/// read ambient state themselves.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub symbols: Vec<Symbol>,
    pub interval: Interval,
    pub lookback: Duration,
    pub db_path: PathBuf,
}

impl RunConfig {
    pub fn load(cli: &Cli, args: &IngestArgs) -> Result<Self, CliError> {
        let raw_symbols = args
            .symbols
            .clone()
            .or_else(|| env::var("BARFEED_SYMBOLS").ok())
            .unwrap_or_else(|| String::from(DEFAULT_SYMBOLS));
        let symbols = parse_symbols(&raw_symbols)?;

        let raw_interval = args
            .interval
            .clone()
            .or_else(|| env::var("BARFEED_INTERVAL").ok())
            .unwrap_or_else(|| String::from(DEFAULT_INTERVAL));
        let interval = Interval::from_str(&raw_interval)?;

        let raw_lookback = args
            .lookback
            .clone()
            .or_else(|| env::var("BARFEED_LOOKBACK").ok())
            .unwrap_or_else(|| String::from(DEFAULT_LOOKBACK));
        let lookback = parse_lookback(&raw_lookback)?;

        Ok(Self {
            symbols,
            interval,
            lookback,
            db_path: resolve_db_path(cli),
        })
    }
}

pub fn resolve_db_path(cli: &Cli) -> PathBuf {
    cli.db_path
        .clone()
        .or_else(|| env::var("BARFEED_DB_PATH").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH))
}

fn parse_symbols(raw: &str) -> Result<Vec<Symbol>, CliError> {
    let mut symbols = Vec::new();
    for piece in raw.split(',') {
        let piece = piece.trim();
        if piece.is_empty() {
            continue;
        }
        symbols.push(Symbol::parse(piece)?);
    }
    if symbols.is_empty() {
        return Err(CliError::Config(String::from(
            "symbol list resolved to nothing",
        )));
    }
    Ok(symbols)
}

/// Parse a history window like `30d`, `12h`, or `45m`.
fn parse_lookback(raw: &str) -> Result<Duration, CliError> {
    let value = raw.trim().to_ascii_lowercase();
    let (digits, unit_seconds) = match value.chars().last() {
        Some('d') => (&value[..value.len() - 1], 86_400u64),
        Some('h') => (&value[..value.len() - 1], 3_600),
        Some('m') => (&value[..value.len() - 1], 60),
        _ => {
            return Err(CliError::Config(format!(
                "invalid lookback '{raw}', expected e.g. 30d, 12h, 45m"
            )))
        }
    };

    let count: u64 = digits
        .parse()
        .map_err(|_| CliError::Config(format!("invalid lookback '{raw}'")))?;
    if count == 0 {
        return Err(CliError::Config(String::from("lookback must be positive")));
    }

    Ok(Duration::from_secs(count * unit_seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_symbol_list_with_spacing_and_case() {
        let symbols = parse_symbols(" aapl, googl ,TSLA").expect("must parse");
        let names: Vec<&str> = symbols.iter().map(Symbol::as_str).collect();
        assert_eq!(names, vec!["AAPL", "GOOGL", "TSLA"]);
    }

    #[test]
    fn rejects_all_empty_symbol_list() {
        assert!(parse_symbols(" , ,").is_err());
    }

    #[test]
    fn parses_lookback_units() {
        assert_eq!(
            parse_lookback("30d").expect("days"),
            Duration::from_secs(30 * 86_400)
        );
        assert_eq!(
            parse_lookback("12h").expect("hours"),
            Duration::from_secs(12 * 3_600)
        );
        assert_eq!(parse_lookback("45m").expect("minutes"), Duration::from_secs(45 * 60));
    }

    #[test]
    fn rejects_zero_and_malformed_lookback() {
        assert!(parse_lookback("0d").is_err());
        assert!(parse_lookback("30").is_err());
        assert!(parse_lookback("soon").is_err());
    }
}
