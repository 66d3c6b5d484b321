use thiserror::Error;

/// Validation errors for domain values and per-bar sanity checks.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter: '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("invalid interval '{value}', expected one of 1m, 5m, 15m, 1h, 1d")]
    InvalidInterval { value: String },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },
    #[error("timestamp out of representable range: {unix}")]
    TimestampOutOfRange { unix: i64 },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("high below low")]
    HighBelowLow,
    #[error("open outside low/high range")]
    OpenOutsideRange,
    #[error("close outside low/high range")]
    CloseOutsideRange,

    #[error("timestamp {ts} is in the future")]
    FutureTimestamp { ts: String },
    #[error("timestamp {ts} is earlier than previous bar at {previous}")]
    NonMonotonicTimestamp { ts: String, previous: String },
}
