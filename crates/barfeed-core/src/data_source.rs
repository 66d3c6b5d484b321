use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;

use crate::{Interval, ProviderId, Symbol, UtcDateTime};

/// Provider-shaped bar before symbol/interval attachment and validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawBar {
    pub ts: UtcDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Request payload for the bars endpoint of a market-data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarsRequest {
    pub symbol: Symbol,
    pub interval: Interval,
    pub lookback: Duration,
}

impl BarsRequest {
    pub fn new(symbol: Symbol, interval: Interval, lookback: Duration) -> Result<Self, SourceError> {
        if lookback.is_zero() {
            return Err(SourceError::InvalidRequest(String::from(
                "lookback must be positive",
            )));
        }
        Ok(Self {
            symbol,
            interval,
            lookback,
        })
    }
}

/// Adapter-level error classification.
///
/// `Network` and `RateLimited` are transient; the collector retries them.
/// `Provider` and `InvalidRequest` are terminal for the request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("network error: {0}")]
    Network(String),
    #[error("rate limited by provider")]
    RateLimited { retry_after: Option<Duration> },
    #[error("provider error: {0}")]
    Provider(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl SourceError {
    pub const fn retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::RateLimited { .. })
    }
}

/// Market-data source contract.
///
/// One logical request per call; bars come back in the provider's ascending
/// timestamp order and are never reordered here.
pub trait MarketDataSource: Send + Sync {
    fn id(&self) -> ProviderId;

    fn bars<'a>(
        &'a self,
        request: &'a BarsRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<RawBar>, SourceError>> + Send + 'a>>;
}
