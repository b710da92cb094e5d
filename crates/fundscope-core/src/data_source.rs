//! Endpoint catalog and the data source contract used by the aggregator.
//!
//! # Endpoints
//!
//! | Endpoint | Provider function | Cache suffix | Output |
//! |----------|-------------------|--------------|--------|
//! | Profile | `OVERVIEW` | `overview` | [`CompanyProfile`] |
//! | Historical prices | `TIME_SERIES_WEEKLY_ADJUSTED` | `daily` | `Vec<PricePoint>` |
//! | Income statement | `INCOME_STATEMENT` | `income` | `TimeSeriesBundle<IncomeRecord>` |
//! | Cash flow | `CASH_FLOW` | `cashflow` | `TimeSeriesBundle<CashFlowRecord>` |
//! | Balance sheet | `BALANCE_SHEET` | `balance` | `TimeSeriesBundle<BalanceSheetRecord>` |
//! | Earnings | `EARNINGS` | `earnings` | `TimeSeriesBundle<EarningsRecord>` |
//! | Dividends | `DIVIDENDS` | `dividends` | [`DividendsBundle`] |

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::{
    BalanceSheetRecord, CashFlowRecord, CompanyProfile, DividendsBundle, EarningsRecord,
    FetchError, IncomeRecord, PricePoint, Symbol, TimeSeriesBundle,
};

/// One report type offered by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Profile,
    HistoricalPrices,
    IncomeStatement,
    CashFlow,
    BalanceSheet,
    Earnings,
    Dividends,
}

impl Endpoint {
    /// Fan-out order used by the aggregator and in error listings.
    pub const ALL: [Endpoint; 7] = [
        Self::Profile,
        Self::HistoricalPrices,
        Self::IncomeStatement,
        Self::CashFlow,
        Self::BalanceSheet,
        Self::Earnings,
        Self::Dividends,
    ];

    /// Value of the provider's `function` query parameter.
    pub const fn function(self) -> &'static str {
        match self {
            Self::Profile => "OVERVIEW",
            Self::HistoricalPrices => "TIME_SERIES_WEEKLY_ADJUSTED",
            Self::IncomeStatement => "INCOME_STATEMENT",
            Self::CashFlow => "CASH_FLOW",
            Self::BalanceSheet => "BALANCE_SHEET",
            Self::Earnings => "EARNINGS",
            Self::Dividends => "DIVIDENDS",
        }
    }

    /// Suffix of the cache key.
    pub const fn cache_name(self) -> &'static str {
        match self {
            Self::Profile => "overview",
            Self::HistoricalPrices => "daily",
            Self::IncomeStatement => "income",
            Self::CashFlow => "cashflow",
            Self::BalanceSheet => "balance",
            Self::Earnings => "earnings",
            Self::Dividends => "dividends",
        }
    }

    /// Human-readable name used to prefix per-endpoint errors.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Profile => "Profile",
            Self::HistoricalPrices => "Historical Data",
            Self::IncomeStatement => "Income Statement",
            Self::CashFlow => "Cash Flow",
            Self::BalanceSheet => "Balance Sheet",
            Self::Earnings => "Earnings",
            Self::Dividends => "Dividends",
        }
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.cache_name())
    }
}

pub type FetchFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, FetchError>> + Send + 'a>>;

/// Per-endpoint fetch contract.
///
/// Each method returns the normalized payload for one symbol, served from
/// cache when fresh. Implementations must be `Send + Sync`; the aggregator
/// drives all seven calls concurrently on one task.
pub trait FinancialDataSource: Send + Sync {
    fn company_profile<'a>(&'a self, symbol: &'a Symbol) -> FetchFuture<'a, CompanyProfile>;

    fn historical_prices<'a>(&'a self, symbol: &'a Symbol) -> FetchFuture<'a, Vec<PricePoint>>;

    fn income_statement<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> FetchFuture<'a, TimeSeriesBundle<IncomeRecord>>;

    fn cash_flow_statement<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> FetchFuture<'a, TimeSeriesBundle<CashFlowRecord>>;

    fn balance_sheet<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> FetchFuture<'a, TimeSeriesBundle<BalanceSheetRecord>>;

    fn earnings<'a>(&'a self, symbol: &'a Symbol) -> FetchFuture<'a, TimeSeriesBundle<EarningsRecord>>;

    fn dividends<'a>(&'a self, symbol: &'a Symbol) -> FetchFuture<'a, DividendsBundle>;

    /// Checked once before the fan-out; a failure aborts the whole lookup.
    fn authorize(&self, symbol: &Symbol) -> Result<(), FetchError>;
}
