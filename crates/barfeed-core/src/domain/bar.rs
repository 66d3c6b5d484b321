use serde::{Deserialize, Serialize};

use crate::data_source::RawBar;
use crate::{Interval, Symbol, UtcDateTime, ValidationError};

/// One validated OHLCV observation.
///
/// The tuple `(symbol, ts, interval)` is the identity key; the store never
/// holds two rows with the same key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub symbol: Symbol,
    pub ts: UtcDateTime,
    pub interval: Interval,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        symbol: Symbol,
        ts: UtcDateTime,
        interval: Interval,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Result<Self, ValidationError> {
        validate_price("open", open)?;
        validate_price("high", high)?;
        validate_price("low", low)?;
        validate_price("close", close)?;

        if high < low {
            return Err(ValidationError::HighBelowLow);
        }
        if open < low || open > high {
            return Err(ValidationError::OpenOutsideRange);
        }
        if close < low || close > high {
            return Err(ValidationError::CloseOutsideRange);
        }

        Ok(Self {
            symbol,
            ts,
            interval,
            open,
            high,
            low,
            close,
            volume,
        })
    }

    /// Attach symbol and interval to a provider-shaped bar, running the
    /// structural checks.
    pub fn from_raw(symbol: Symbol, interval: Interval, raw: &RawBar) -> Result<Self, ValidationError> {
        Self::new(
            symbol,
            raw.ts,
            interval,
            raw.open,
            raw.high,
            raw.low,
            raw.close,
            raw.volume,
        )
    }
}

fn validate_price(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol() -> Symbol {
        Symbol::parse("AAPL").expect("symbol")
    }

    fn ts() -> UtcDateTime {
        UtcDateTime::parse("2024-01-02T00:00:00Z").expect("timestamp")
    }

    #[test]
    fn accepts_well_formed_bar() {
        let bar = Bar::new(symbol(), ts(), Interval::OneDay, 101.0, 102.5, 99.5, 100.0, 1_000)
            .expect("must build");
        assert_eq!(bar.symbol.as_str(), "AAPL");
        assert_eq!(bar.volume, 1_000);
    }

    #[test]
    fn rejects_high_below_low() {
        let err = Bar::new(symbol(), ts(), Interval::OneDay, 145.0, 140.0, 150.0, 145.0, 10)
            .expect_err("must fail");
        assert_eq!(err, ValidationError::HighBelowLow);
        assert_eq!(err.to_string(), "high below low");
    }

    #[test]
    fn rejects_open_outside_range() {
        let err = Bar::new(symbol(), ts(), Interval::OneDay, 98.0, 102.0, 99.0, 100.0, 10)
            .expect_err("must fail");
        assert_eq!(err, ValidationError::OpenOutsideRange);
    }

    #[test]
    fn rejects_close_outside_range() {
        let err = Bar::new(symbol(), ts(), Interval::OneDay, 100.0, 102.0, 99.0, 102.5, 10)
            .expect_err("must fail");
        assert_eq!(err, ValidationError::CloseOutsideRange);
    }

    #[test]
    fn rejects_negative_price() {
        let err = Bar::new(symbol(), ts(), Interval::OneDay, -1.0, 102.0, 99.0, 100.0, 10)
            .expect_err("must fail");
        assert!(matches!(err, ValidationError::NegativeValue { field: "open" }));
    }

    #[test]
    fn rejects_non_finite_price() {
        let err = Bar::new(symbol(), ts(), Interval::OneDay, 100.0, f64::NAN, 99.0, 100.0, 10)
            .expect_err("must fail");
        assert!(matches!(err, ValidationError::NonFiniteValue { field: "high" }));
    }
}
