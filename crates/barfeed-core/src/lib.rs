//! Core contracts for barfeed.
//!
//! This crate contains:
//! - Canonical domain models and validation
//! - The market-data source trait and the Yahoo adapter
//! - Retry/backoff and request pacing
//! - The collector, batch validator, and ingestion runner

pub mod adapters;
pub mod collector;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod pacing;
pub mod retry;
pub mod runner;
pub mod source;
pub mod validator;

pub use adapters::YahooSource;
pub use collector::{CollectError, Collector};
pub use data_source::{BarsRequest, MarketDataSource, RawBar, SourceError};
pub use domain::{Bar, Interval, Symbol, UtcDateTime};
pub use error::ValidationError;
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};
pub use pacing::RequestPacer;
pub use retry::{Backoff, RetryConfig};
pub use runner::{run_ingestion, IngestPlan, RunReport, SymbolFailure};
pub use source::ProviderId;
pub use validator::{validate_batch, BatchOutcome, RejectedBar};
