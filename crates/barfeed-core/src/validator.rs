use crate::data_source::RawBar;
use crate::{Bar, Interval, Symbol, UtcDateTime, ValidationError};

/// Close-to-close move beyond this fraction flags a bar as a potential
/// outlier. Flagged bars are still accepted.
const OUTLIER_CHANGE_THRESHOLD: f64 = 0.5;

/// A bar dropped during batch validation, with the reason recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedBar {
    pub ts: UtcDateTime,
    pub reason: ValidationError,
}

/// Result of validating one fetched batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    pub accepted: Vec<Bar>,
    pub rejected: Vec<RejectedBar>,
    pub warnings: Vec<String>,
}

/// Validate one fetched batch for a symbol.
///
/// Pure over its inputs: `now` is the collection time supplied by the
/// caller. Rejections are per-bar; a batch is never fatal as a whole.
/// Timestamp monotonicity is checked within this batch only, against the
/// last accepted bar.
pub fn validate_batch(
    symbol: &Symbol,
    interval: Interval,
    raws: &[RawBar],
    now: UtcDateTime,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    let mut previous_ts: Option<UtcDateTime> = None;
    let mut previous_close: Option<f64> = None;

    for raw in raws {
        if raw.ts > now {
            outcome.rejected.push(RejectedBar {
                ts: raw.ts,
                reason: ValidationError::FutureTimestamp {
                    ts: raw.ts.format_rfc3339(),
                },
            });
            continue;
        }

        if let Some(previous) = previous_ts {
            if raw.ts < previous {
                outcome.rejected.push(RejectedBar {
                    ts: raw.ts,
                    reason: ValidationError::NonMonotonicTimestamp {
                        ts: raw.ts.format_rfc3339(),
                        previous: previous.format_rfc3339(),
                    },
                });
                continue;
            }
        }

        match Bar::from_raw(symbol.clone(), interval, raw) {
            Ok(bar) => {
                if let Some(prev_close) = previous_close {
                    if prev_close > 0.0 {
                        let change = (bar.close / prev_close - 1.0).abs();
                        if change > OUTLIER_CHANGE_THRESHOLD {
                            outcome.warnings.push(format!(
                                "{symbol} {}: close moved {:.1}% against previous bar",
                                bar.ts,
                                change * 100.0
                            ));
                        }
                    }
                }
                previous_ts = Some(bar.ts);
                previous_close = Some(bar.close);
                outcome.accepted.push(bar);
            }
            Err(reason) => {
                outcome.rejected.push(RejectedBar {
                    ts: raw.ts,
                    reason,
                });
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol() -> Symbol {
        Symbol::parse("AAPL").expect("symbol")
    }

    fn raw(ts: &str, open: f64, high: f64, low: f64, close: f64) -> RawBar {
        RawBar {
            ts: UtcDateTime::parse(ts).expect("timestamp"),
            open,
            high,
            low,
            close,
            volume: 1_000,
        }
    }

    fn collection_time() -> UtcDateTime {
        UtcDateTime::parse("2024-01-10T00:00:00Z").expect("timestamp")
    }

    #[test]
    fn accepts_well_formed_ascending_batch() {
        let raws = vec![
            raw("2024-01-01T00:00:00Z", 100.0, 102.0, 99.0, 101.0),
            raw("2024-01-02T00:00:00Z", 101.0, 103.0, 100.0, 102.0),
        ];

        let outcome = validate_batch(&symbol(), Interval::OneDay, &raws, collection_time());

        assert_eq!(outcome.accepted.len(), 2);
        assert!(outcome.rejected.is_empty());
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn rejects_high_below_low_and_keeps_the_rest() {
        let raws = vec![
            raw("2024-01-01T00:00:00Z", 148.0, 152.0, 147.0, 150.0),
            raw("2024-01-02T00:00:00Z", 145.0, 140.0, 150.0, 145.0),
            raw("2024-01-03T00:00:00Z", 150.0, 153.0, 149.0, 151.0),
        ];

        let outcome = validate_batch(&symbol(), Interval::OneDay, &raws, collection_time());

        assert_eq!(outcome.accepted.len(), 2);
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].reason.to_string(), "high below low");
    }

    #[test]
    fn rejects_future_timestamp() {
        let raws = vec![raw("2024-02-01T00:00:00Z", 100.0, 102.0, 99.0, 101.0)];

        let outcome = validate_batch(&symbol(), Interval::OneDay, &raws, collection_time());

        assert!(outcome.accepted.is_empty());
        assert!(matches!(
            outcome.rejected[0].reason,
            ValidationError::FutureTimestamp { .. }
        ));
    }

    #[test]
    fn rejects_non_monotonic_timestamp_within_batch() {
        let raws = vec![
            raw("2024-01-03T00:00:00Z", 100.0, 102.0, 99.0, 101.0),
            raw("2024-01-02T00:00:00Z", 101.0, 103.0, 100.0, 102.0),
            raw("2024-01-04T00:00:00Z", 101.0, 103.0, 100.0, 102.0),
        ];

        let outcome = validate_batch(&symbol(), Interval::OneDay, &raws, collection_time());

        assert_eq!(outcome.accepted.len(), 2);
        assert_eq!(outcome.rejected.len(), 1);
        assert!(matches!(
            outcome.rejected[0].reason,
            ValidationError::NonMonotonicTimestamp { .. }
        ));
    }

    #[test]
    fn equal_timestamps_are_not_rejected() {
        let raws = vec![
            raw("2024-01-01T00:00:00Z", 100.0, 102.0, 99.0, 101.0),
            raw("2024-01-01T00:00:00Z", 100.0, 102.0, 99.0, 101.0),
        ];

        let outcome = validate_batch(&symbol(), Interval::OneDay, &raws, collection_time());

        // Duplicate keys are the store's concern, not the validator's.
        assert_eq!(outcome.accepted.len(), 2);
    }

    #[test]
    fn large_close_move_warns_but_accepts() {
        let raws = vec![
            raw("2024-01-01T00:00:00Z", 100.0, 102.0, 99.0, 100.0),
            raw("2024-01-02T00:00:00Z", 100.0, 160.0, 99.0, 160.0),
        ];

        let outcome = validate_batch(&symbol(), Interval::OneDay, &raws, collection_time());

        assert_eq!(outcome.accepted.len(), 2);
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("close moved"));
    }
}
