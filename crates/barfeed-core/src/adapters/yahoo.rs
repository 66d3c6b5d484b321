use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::data_source::{BarsRequest, MarketDataSource, RawBar, SourceError};
use crate::http_client::{HttpClient, HttpRequest, HttpResponse};
use crate::{ProviderId, UtcDateTime};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Yahoo Finance chart-endpoint adapter.
pub struct YahooSource {
    client: Arc<dyn HttpClient>,
    base_url: String,
    timeout: Duration,
}

impl YahooSource {
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        Self {
            client,
            base_url: String::from(DEFAULT_BASE_URL),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn request_url(&self, request: &BarsRequest, now: UtcDateTime) -> String {
        let period2 = now.unix_timestamp();
        let period1 = period2.saturating_sub(request.lookback.as_secs() as i64);
        format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval={}",
            self.base_url,
            urlencoding::encode(request.symbol.as_str()),
            period1,
            period2,
            request.interval
        )
    }
}

impl MarketDataSource for YahooSource {
    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    fn bars<'a>(
        &'a self,
        request: &'a BarsRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<RawBar>, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            let url = self.request_url(request, UtcDateTime::now());
            let response = self
                .client
                .execute(
                    HttpRequest::get(url)
                        .with_header("accept", "application/json")
                        .with_timeout(self.timeout),
                )
                .await
                .map_err(|error| {
                    if error.retryable() {
                        SourceError::Network(error.message().to_owned())
                    } else {
                        SourceError::Provider(error.message().to_owned())
                    }
                })?;

            classify_status(&response)?;
            parse_chart_body(&response.body)
        })
    }
}

fn classify_status(response: &HttpResponse) -> Result<(), SourceError> {
    match response.status {
        _ if response.is_success() => Ok(()),
        429 => Err(SourceError::RateLimited {
            retry_after: parse_retry_after(response),
        }),
        408 | 500..=599 => Err(SourceError::Network(format!(
            "provider returned status {}",
            response.status
        ))),
        status => Err(SourceError::Provider(format!(
            "provider returned status {status}"
        ))),
    }
}

fn parse_retry_after(response: &HttpResponse) -> Option<Duration> {
    response
        .headers
        .get("retry-after")
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartPayload,
}

#[derive(Debug, Deserialize)]
struct ChartPayload {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Deserialize, Default)]
struct QuoteBlock {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

fn parse_chart_body(body: &str) -> Result<Vec<RawBar>, SourceError> {
    let envelope: ChartEnvelope = serde_json::from_str(body)
        .map_err(|error| SourceError::Provider(format!("malformed chart payload: {error}")))?;

    if let Some(error) = envelope.chart.error {
        return Err(SourceError::Provider(format!(
            "{}: {}",
            error.code, error.description
        )));
    }

    let result = envelope
        .chart
        .result
        .and_then(|mut results| {
            if results.is_empty() {
                None
            } else {
                Some(results.remove(0))
            }
        })
        .ok_or_else(|| SourceError::Provider(String::from("chart payload has no result")))?;

    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .unwrap_or_default();

    let mut bars = Vec::with_capacity(timestamps.len());
    for (index, unix) in timestamps.iter().enumerate() {
        let fields = (
            quote.open.get(index).copied().flatten(),
            quote.high.get(index).copied().flatten(),
            quote.low.get(index).copied().flatten(),
            quote.close.get(index).copied().flatten(),
        );
        // Provider leaves null rows for halted sessions; skip them.
        let (Some(open), Some(high), Some(low), Some(close)) = fields else {
            continue;
        };

        let ts = UtcDateTime::from_unix_timestamp(*unix)
            .map_err(|error| SourceError::Provider(error.to_string()))?;
        let volume = quote.volume.get(index).copied().flatten().unwrap_or(0);

        bars.push(RawBar {
            ts,
            open,
            high,
            low,
            close,
            volume,
        });
    }

    Ok(bars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::HttpError;
    use crate::{Interval, Symbol};

    struct ScriptedClient {
        response: Result<HttpResponse, HttpError>,
    }

    impl HttpClient for ScriptedClient {
        fn execute<'a>(
            &'a self,
            _request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            let response = self.response.clone();
            Box::pin(async move { response })
        }
    }

    fn request() -> BarsRequest {
        BarsRequest::new(
            Symbol::parse("AAPL").expect("symbol"),
            Interval::OneDay,
            Duration::from_secs(86_400 * 3),
        )
        .expect("request")
    }

    const CHART_BODY: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"symbol": "AAPL"},
                "timestamp": [1704153600, 1704240000, 1704326400],
                "indicators": {
                    "quote": [{
                        "open": [185.0, null, 186.5],
                        "high": [186.0, null, 188.0],
                        "low": [184.0, null, 186.0],
                        "close": [185.5, null, 187.2],
                        "volume": [50000000, null, null]
                    }]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn parses_chart_body_and_skips_null_rows() {
        let bars = parse_chart_body(CHART_BODY).expect("must parse");

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].ts.format_rfc3339(), "2024-01-02T00:00:00Z");
        assert_eq!(bars[0].open, 185.0);
        assert_eq!(bars[0].volume, 50_000_000);
        assert_eq!(bars[1].volume, 0);
    }

    #[test]
    fn surfaces_chart_error_as_provider_error() {
        let body = r#"{"chart": {"result": null, "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}}}"#;
        let err = parse_chart_body(body).expect_err("must fail");
        assert!(matches!(err, SourceError::Provider(ref message) if message.contains("Not Found")));
    }

    #[test]
    fn malformed_payload_is_a_provider_error() {
        let err = parse_chart_body("{not json").expect_err("must fail");
        assert!(matches!(err, SourceError::Provider(_)));
        assert!(!err.retryable());
    }

    #[tokio::test]
    async fn rate_limit_status_maps_to_rate_limited_with_cooldown() {
        let source = YahooSource::new(Arc::new(ScriptedClient {
            response: Ok(HttpResponse::status_only(429).with_header("Retry-After", "7")),
        }));

        let err = source.bars(&request()).await.expect_err("must fail");
        assert_eq!(
            err,
            SourceError::RateLimited {
                retry_after: Some(Duration::from_secs(7))
            }
        );
    }

    #[tokio::test]
    async fn server_errors_map_to_network_errors() {
        let source = YahooSource::new(Arc::new(ScriptedClient {
            response: Ok(HttpResponse::status_only(503)),
        }));

        let err = source.bars(&request()).await.expect_err("must fail");
        assert!(matches!(err, SourceError::Network(_)));
        assert!(err.retryable());
    }

    #[tokio::test]
    async fn transport_timeout_maps_to_network_error() {
        let source = YahooSource::new(Arc::new(ScriptedClient {
            response: Err(HttpError::new("request timeout")),
        }));

        let err = source.bars(&request()).await.expect_err("must fail");
        assert!(matches!(err, SourceError::Network(_)));
    }

    #[test]
    fn request_url_uses_epoch_window_and_interval() {
        let source = YahooSource::new(Arc::new(ScriptedClient {
            response: Ok(HttpResponse::ok_json("{}")),
        }))
        .with_base_url("https://example.test");

        let now = UtcDateTime::parse("2024-01-10T00:00:00Z").expect("timestamp");
        let url = source.request_url(&request(), now);

        assert_eq!(
            url,
            "https://example.test/v8/finance/chart/AAPL?period1=1704585600&period2=1704844800&interval=1d"
        );
    }
}
