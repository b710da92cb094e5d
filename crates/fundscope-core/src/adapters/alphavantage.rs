use std::sync::Arc;

use fundscope_store::KvStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use time::Date;

use crate::cache::{Cacheable, ResponseCache};
use crate::clock::{Clock, SystemClock};
use crate::config::ClientConfig;
use crate::data_source::{Endpoint, FetchFuture, FinancialDataSource};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::normalize;
use crate::rate_limit::RateLimit;
use crate::throttling::RequestPacer;
use crate::{
    BalanceSheetRecord, CashFlowRecord, CompanyProfile, DividendsBundle, EarningsRecord,
    FetchError, IncomeRecord, PricePoint, Symbol, TimeSeriesBundle,
};

/// Symbol queried by [`AlphaVantageClient::verify_api_key`].
const KEY_CHECK_SYMBOL: &str = "AAPL";
const KEY_CHECK_FUNCTION: &str = "GLOBAL_QUOTE";

/// Alpha Vantage client with a persistent response cache.
///
/// Every endpoint follows the same path: demo-key check, cache lookup,
/// request, throttling check, normalization, cache write.
#[derive(Clone)]
pub struct AlphaVantageClient {
    config: ClientConfig,
    http_client: Arc<dyn HttpClient>,
    cache: ResponseCache,
    clock: Arc<dyn Clock>,
    pacer: Option<RequestPacer>,
}

impl AlphaVantageClient {
    /// Client over the real network and wall clock.
    pub fn new(config: ClientConfig, store: Arc<dyn KvStore>) -> Self {
        Self::with_parts(
            config,
            Arc::new(ReqwestHttpClient::new()),
            store,
            Arc::new(SystemClock),
        )
    }

    pub fn with_parts(
        config: ClientConfig,
        http_client: Arc<dyn HttpClient>,
        store: Arc<dyn KvStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let cache = ResponseCache::with_ttl(store, Arc::clone(&clock), config.cache_ttl);
        let pacer = config.requests_per_minute.map(RequestPacer::per_minute);
        Self {
            config,
            http_client,
            cache,
            clock,
            pacer,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn today(&self) -> Date {
        self.clock.today()
    }

    /// Send a cheap quote request and report whether the key is usable.
    ///
    /// Returns the raw quote body on success.
    pub async fn verify_api_key(&self) -> Result<Value, FetchError> {
        let body = self.query(KEY_CHECK_FUNCTION, KEY_CHECK_SYMBOL).await?;
        if let Some(message) = body.get("Error Message").and_then(Value::as_str) {
            return Err(FetchError::Transport(format!("API key rejected: {message}")));
        }
        Ok(body)
    }

    async fn query(&self, function: &str, symbol: &str) -> Result<Value, FetchError> {
        if let Some(pacer) = &self.pacer {
            pacer.ready().await;
        }

        let request = HttpRequest::get(&self.config.base_url)
            .with_param("function", function)
            .with_param("symbol", symbol)
            .with_param("apikey", self.config.api_key.expose())
            .with_timeout_ms(self.config.timeout_ms);
        tracing::debug!(url = %request.redacted_url(), "requesting provider data");

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|error| FetchError::Transport(error.message().to_owned()))?;

        if let Some(limit) = RateLimit::from_status(response.status) {
            return Err(FetchError::RateLimited(limit));
        }

        let decoded = serde_json::from_str::<Value>(&response.body);
        if !response.is_success() {
            if let Some(limit) = decoded.as_ref().ok().and_then(RateLimit::detect) {
                return Err(FetchError::RateLimited(limit));
            }
            return Err(FetchError::Transport(format!(
                "provider returned status {}",
                response.status
            )));
        }

        let body = decoded.map_err(|error| FetchError::Decode(error.to_string()))?;
        if let Some(limit) = RateLimit::detect(&body) {
            return Err(FetchError::RateLimited(limit));
        }
        Ok(body)
    }

    async fn cached<T, N>(
        &self,
        symbol: &Symbol,
        endpoint: Endpoint,
        normalize: N,
    ) -> Result<T, FetchError>
    where
        T: Serialize + DeserializeOwned + Cacheable,
        N: FnOnce(&Value) -> Result<T, FetchError>,
    {
        self.authorize(symbol)?;

        if let Some(hit) = self.cache.get::<T>(symbol, endpoint) {
            return Ok(hit);
        }

        let body = self.query(endpoint.function(), symbol.as_str()).await?;
        let payload = normalize(&body)?;
        self.cache.put(symbol, endpoint, &payload);
        Ok(payload)
    }
}

impl FinancialDataSource for AlphaVantageClient {
    fn company_profile<'a>(&'a self, symbol: &'a Symbol) -> FetchFuture<'a, CompanyProfile> {
        Box::pin(self.cached(symbol, Endpoint::Profile, move |body| {
            normalize::company_profile(body, symbol)
        }))
    }

    fn historical_prices<'a>(&'a self, symbol: &'a Symbol) -> FetchFuture<'a, Vec<PricePoint>> {
        Box::pin(self.cached(symbol, Endpoint::HistoricalPrices, move |body| {
            normalize::historical_prices(body, symbol)
        }))
    }

    fn income_statement<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> FetchFuture<'a, TimeSeriesBundle<IncomeRecord>> {
        let today = self.today();
        Box::pin(self.cached(symbol, Endpoint::IncomeStatement, move |body| {
            normalize::income_statement(body, symbol, today)
        }))
    }

    fn cash_flow_statement<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> FetchFuture<'a, TimeSeriesBundle<CashFlowRecord>> {
        let today = self.today();
        Box::pin(self.cached(symbol, Endpoint::CashFlow, move |body| {
            normalize::cash_flow_statement(body, symbol, today)
        }))
    }

    fn balance_sheet<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> FetchFuture<'a, TimeSeriesBundle<BalanceSheetRecord>> {
        let today = self.today();
        Box::pin(self.cached(symbol, Endpoint::BalanceSheet, move |body| {
            normalize::balance_sheet(body, symbol, today)
        }))
    }

    fn earnings<'a>(&'a self, symbol: &'a Symbol) -> FetchFuture<'a, TimeSeriesBundle<EarningsRecord>> {
        let today = self.today();
        Box::pin(self.cached(symbol, Endpoint::Earnings, move |body| {
            normalize::earnings(body, symbol, today)
        }))
    }

    fn dividends<'a>(&'a self, symbol: &'a Symbol) -> FetchFuture<'a, DividendsBundle> {
        let today = self.today();
        Box::pin(self.cached(symbol, Endpoint::Dividends, move |body| {
            normalize::dividends(body, symbol, today)
        }))
    }

    fn authorize(&self, symbol: &Symbol) -> Result<(), FetchError> {
        self.config.api_key.authorize(symbol)
    }
}
