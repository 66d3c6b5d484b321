use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::data_source::{BarsRequest, MarketDataSource, RawBar, SourceError};
use crate::pacing::RequestPacer;
use crate::retry::RetryConfig;
use crate::{Interval, ProviderId, Symbol};

/// Terminal collection failure for one symbol. The caller logs it and moves
/// on to the next symbol; it never aborts the run.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("invalid fetch request for {symbol}: {source}")]
    Request {
        symbol: Symbol,
        #[source]
        source: SourceError,
    },
    #[error("provider failed for {symbol} ({interval}) after {attempts} attempt(s): {source}")]
    Provider {
        symbol: Symbol,
        interval: Interval,
        attempts: u32,
        #[source]
        source: SourceError,
    },
}

/// Fetches raw bars from a market-data source, retrying transient failures
/// with backoff and honoring rate-limit cooldowns.
pub struct Collector {
    source: Arc<dyn MarketDataSource>,
    retry: RetryConfig,
    pacer: RequestPacer,
}

impl Collector {
    pub fn new(source: Arc<dyn MarketDataSource>, retry: RetryConfig, pacer: RequestPacer) -> Self {
        Self {
            source,
            retry,
            pacer,
        }
    }

    pub fn source_id(&self) -> ProviderId {
        self.source.id()
    }

    /// Issue one logical bars request.
    ///
    /// Transient errors (network, rate limit) are retried up to
    /// `max_retries` times; rate limits wait the provider-indicated cooldown
    /// or the configured default. Bars come back in the provider's ascending
    /// timestamp order.
    pub async fn fetch(
        &self,
        symbol: &Symbol,
        interval: Interval,
        lookback: Duration,
    ) -> Result<Vec<RawBar>, CollectError> {
        let request = BarsRequest::new(symbol.clone(), interval, lookback).map_err(|source| {
            CollectError::Request {
                symbol: symbol.clone(),
                source,
            }
        })?;

        let mut attempts = 0u32;
        loop {
            if let Err(delay) = self.pacer.acquire() {
                tokio::time::sleep(delay).await;
            }

            attempts += 1;
            match self.source.bars(&request).await {
                Ok(bars) => return Ok(bars),
                Err(error) => {
                    let out_of_budget = attempts > self.retry.max_retries;
                    if !self.retry.enabled || !error.retryable() || out_of_budget {
                        return Err(CollectError::Provider {
                            symbol: request.symbol.clone(),
                            interval: request.interval,
                            attempts,
                            source: error,
                        });
                    }

                    let delay = match &error {
                        SourceError::RateLimited { retry_after } => {
                            retry_after.unwrap_or(self.retry.default_cooldown)
                        }
                        _ => self.retry.delay_for_attempt(attempts - 1),
                    };
                    tracing::warn!(
                        symbol = %request.symbol,
                        interval = %request.interval,
                        attempt = attempts,
                        delay_ms = delay.as_millis() as u64,
                        %error,
                        "transient provider failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
