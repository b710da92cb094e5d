//! # Domain Models
//!
//! Canonical, chart-ready shapes produced by the normalizers.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`CompanyProfile`] | Overview snapshot (sector, ratios, 52-week range) |
//! | [`TimeSeriesBundle`] | Annual + quarterly series of one statement |
//! | [`IncomeRecord`] | Revenue, EBITDA, net income, EPS |
//! | [`CashFlowRecord`] | Operating cash flow, capex, free cash flow |
//! | [`BalanceSheetRecord`] | Cash, debt, shares outstanding |
//! | [`EarningsRecord`] | Reported vs. estimated EPS |
//! | [`PricePoint`] | Weekly adjusted close with change |
//! | [`DividendsBundle`] | Per-payment and per-year dividends |
//! | [`Symbol`] | Validated ticker |
//! | [`Timeframe`] | Quarterly (5y) or annual (20y) view |
//!
//! Every dated series is stored in ascending date order.

mod calendar;
mod models;
mod symbol;
mod timeframe;

pub use calendar::{format_date, iso_date, iso_date_list, parse_date, years_before};
pub use models::{
    AnnualDividend, BalanceSheetRecord, CashFlowRecord, CompanyProfile, Dated, DividendPayment,
    DividendsBundle, EarningsRecord, IncomeRecord, Period, PricePoint, TimeSeriesBundle,
};
pub use symbol::Symbol;
pub use timeframe::{filter_history, within_years, Timeframe};
