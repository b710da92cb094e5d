//! # Fundscope Core
//!
//! Fetch, normalize and cache company fundamentals from Alpha Vantage.
//!
//! ## Overview
//!
//! - **Canonical records** for profiles, statements, earnings, dividends and prices
//! - **Normalizers** turning raw provider JSON into ascending, chart-ready series
//! - **Rate-limit detection** for the provider's in-body throttling notices
//! - **TTL cache** over a persistent key-value store
//! - **Aggregator** fanning out over every endpoint with per-endpoint failure isolation
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Alpha Vantage client |
//! | [`aggregator`] | Per-symbol fan-out and composite result |
//! | [`cache`] | 24 hour response cache |
//! | [`clock`] | Injectable wall clock |
//! | [`config`] | Client configuration and API key handling |
//! | [`data_source`] | Endpoint catalog and data source trait |
//! | [`domain`] | Domain models, symbol, timeframe filter |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`labels`] | Axis labels and number formatting |
//! | [`normalize`] | Endpoint normalizers |
//! | [`rate_limit`] | Throttling detection |
//! | [`throttling`] | Optional client-side pacing |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use fundscope_core::{Aggregator, AlphaVantageClient, ClientConfig, Symbol, Timeframe};
//! use fundscope_store::MemoryStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = AlphaVantageClient::new(ClientConfig::default(), Arc::new(MemoryStore::new()));
//!     let aggregator = Aggregator::new(Arc::new(client));
//!
//!     let result = aggregator.fetch_all(&Symbol::parse("IBM")?, Timeframe::Quarterly).await?;
//!     println!("{} weekly closes", result.historical_data.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use fundscope_core::{FetchError, FetchErrorKind};
//!
//! fn describe(error: &FetchError) -> &'static str {
//!     match error.kind() {
//!         FetchErrorKind::RateLimited => "wait before searching again",
//!         FetchErrorKind::ApiKeyRequired => "configure an API key",
//!         FetchErrorKind::InvalidSymbol => "check the ticker",
//!         _ => "try again later",
//!     }
//! }
//! ```
//!
//! ## Security
//!
//! - API keys are masked in `Debug`/`Display` and redacted from logged URLs
//! - All HTTP requests use TLS via rustls

pub mod adapters;
pub mod aggregator;
pub mod cache;
pub mod clock;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod labels;
pub mod normalize;
pub mod rate_limit;
pub mod throttling;

pub use adapters::AlphaVantageClient;

pub use aggregator::{Aggregator, CompositeResult, SearchId, SearchTracker};

pub use cache::{CacheEntryInfo, Cacheable, ResponseCache, DEFAULT_TTL};

pub use clock::{Clock, ManualClock, SystemClock};

pub use config::{ApiKey, ApiKeySource, ClientConfig, ConfigError};

pub use data_source::{Endpoint, FetchFuture, FinancialDataSource};

pub use domain::{
    filter_history, format_date, iso_date, iso_date_list, parse_date, within_years, years_before,
    AnnualDividend, BalanceSheetRecord, CashFlowRecord, CompanyProfile, Dated, DividendPayment,
    DividendsBundle, EarningsRecord, IncomeRecord, Period, PricePoint, Symbol, TimeSeriesBundle,
    Timeframe,
};

pub use error::{CoreError, FetchError, FetchErrorKind, ValidationError};

pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient, ScriptedHttpClient};

pub use rate_limit::{RateLimit, RateLimitKind};

pub use throttling::RequestPacer;
