//! Per-symbol fan-out over every endpoint.
//!
//! All seven calls are issued together and awaited jointly on one task; a
//! failing endpoint never cancels its siblings. Only the joint failure of
//! the profile and the price history fails the lookup. Every other failure
//! degrades to an empty value plus a line in [`CompositeResult::errors`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::clock::{Clock, SystemClock};
use crate::data_source::{Endpoint, FinancialDataSource};
use crate::{
    filter_history, BalanceSheetRecord, CashFlowRecord, CompanyProfile, DividendsBundle,
    EarningsRecord, FetchError, IncomeRecord, PricePoint, Symbol, TimeSeriesBundle, Timeframe,
};

/// Monotonic identifier of one lookup.
pub type SearchId = u64;

/// Everything known about one symbol after a lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeResult {
    pub search_id: SearchId,
    pub symbol: String,
    pub timeframe: Timeframe,
    pub profile: Option<CompanyProfile>,
    /// Full price history as fetched.
    pub original_historical_data: Vec<PricePoint>,
    /// `original_historical_data` cut to the selected timeframe.
    pub historical_data: Vec<PricePoint>,
    pub income_statement: TimeSeriesBundle<IncomeRecord>,
    pub cash_flow_statement: TimeSeriesBundle<CashFlowRecord>,
    pub balance_sheet: TimeSeriesBundle<BalanceSheetRecord>,
    pub earnings_data: TimeSeriesBundle<EarningsRecord>,
    pub dividends_data: DividendsBundle,
    /// `"<Endpoint label>: <reason>"` per failed endpoint, in fan-out order.
    pub errors: Vec<String>,
}

impl CompositeResult {
    /// Re-slice the price history for another timeframe without refetching.
    pub fn with_timeframe(mut self, timeframe: Timeframe, today: Date) -> Self {
        self.historical_data = filter_history(&self.original_historical_data, timeframe, today);
        self.timeframe = timeframe;
        self
    }

    pub fn is_partial(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Issues search ids and tells stale results from current ones.
#[derive(Debug, Default)]
pub struct SearchTracker {
    latest: AtomicU64,
}

impl SearchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new search; every earlier id becomes stale.
    pub fn begin(&self) -> SearchId {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn latest(&self) -> SearchId {
        self.latest.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, id: SearchId) -> bool {
        self.latest() == id
    }

    /// Pass `result` through only if no newer search has started.
    pub fn accept(&self, result: CompositeResult) -> Option<CompositeResult> {
        if self.is_current(result.search_id) {
            Some(result)
        } else {
            tracing::debug!(
                search_id = result.search_id,
                latest = self.latest(),
                "discarding stale search result"
            );
            None
        }
    }
}

pub struct Aggregator {
    source: Arc<dyn FinancialDataSource>,
    clock: Arc<dyn Clock>,
    searches: SearchTracker,
}

impl Aggregator {
    pub fn new(source: Arc<dyn FinancialDataSource>) -> Self {
        Self::with_clock(source, Arc::new(SystemClock))
    }

    pub fn with_clock(source: Arc<dyn FinancialDataSource>, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            clock,
            searches: SearchTracker::new(),
        }
    }

    pub fn searches(&self) -> &SearchTracker {
        &self.searches
    }

    /// Fetch every endpoint for `symbol` and merge the outcomes.
    pub async fn fetch_all(
        &self,
        symbol: &Symbol,
        timeframe: Timeframe,
    ) -> Result<CompositeResult, FetchError> {
        let search_id = self.searches.begin();
        self.source.authorize(symbol)?;
        tracing::info!(%symbol, search_id, timeframe = timeframe.as_str(), "fetching financial data");

        let source = self.source.as_ref();
        let (profile, prices, income, cash_flow, balance, earnings, dividends) = tokio::join!(
            source.company_profile(symbol),
            source.historical_prices(symbol),
            source.income_statement(symbol),
            source.cash_flow_statement(symbol),
            source.balance_sheet(symbol),
            source.earnings(symbol),
            source.dividends(symbol),
        );

        let failures = [
            profile.as_ref().err(),
            prices.as_ref().err(),
            income.as_ref().err(),
            cash_flow.as_ref().err(),
            balance.as_ref().err(),
            earnings.as_ref().err(),
            dividends.as_ref().err(),
        ];
        let mut errors: Vec<String> = Endpoint::ALL
            .iter()
            .zip(failures)
            .filter_map(|(endpoint, failure)| {
                let error = failure?;
                tracing::warn!(
                    %symbol,
                    endpoint = endpoint.cache_name(),
                    code = error.code(),
                    %error,
                    "endpoint failed"
                );
                Some(format!("{}: {error}", endpoint.label()))
            })
            .collect();

        let prices_failed = prices.is_err();
        let original_historical_data = prices.unwrap_or_default();
        let historical_data =
            filter_history(&original_historical_data, timeframe, self.clock.today());

        // Nothing can be shown without a profile or at least one price point.
        if profile.is_err() && historical_data.is_empty() {
            if !prices_failed {
                errors.push(format!(
                    "{}: no price points in the {timeframe} window",
                    Endpoint::HistoricalPrices.label()
                ));
            }
            return Err(FetchError::BasicDataUnavailable {
                symbol: symbol.to_string(),
                errors,
            });
        }

        Ok(CompositeResult {
            search_id,
            symbol: symbol.to_string(),
            timeframe,
            profile: profile.ok(),
            historical_data,
            original_historical_data,
            income_statement: income.unwrap_or_default(),
            cash_flow_statement: cash_flow.unwrap_or_default(),
            balance_sheet: balance.unwrap_or_default(),
            earnings_data: earnings.unwrap_or_default(),
            dividends_data: dividends.unwrap_or_default(),
            errors,
        })
    }
}
