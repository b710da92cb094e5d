use serde::{Deserialize, Serialize};
use time::Date;

use super::calendar::{iso_date, iso_date_list};
use crate::cache::Cacheable;

/// Reporting period of a statement entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Annual,
    Quarter,
}

impl Period {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Annual => "annual",
            Self::Quarter => "quarter",
        }
    }
}

/// Records that sit on a calendar date and can be ordered by it.
pub trait Dated {
    fn date(&self) -> Date;
}

/// Annual and quarterly series for one statement category.
///
/// Both series are in ascending date order. Quarterly holds at most the 20
/// most recent entries; annual never contains the current calendar year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesBundle<T> {
    pub annual: Vec<T>,
    pub quarterly: Vec<T>,
}

impl<T> TimeSeriesBundle<T> {
    pub fn empty() -> Self {
        Self {
            annual: Vec::new(),
            quarterly: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.annual.is_empty() && self.quarterly.is_empty()
    }
}

impl<T> Default for TimeSeriesBundle<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> Cacheable for TimeSeriesBundle<T> {
    fn is_cacheable(&self) -> bool {
        !self.is_empty()
    }
}

/// Company overview snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    pub symbol: String,
    pub company_name: Option<String>,
    pub description: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub exchange: Option<String>,
    pub currency: Option<String>,
    pub country: Option<String>,
    pub market_cap: i64,
    pub pe_ratio: f64,
    pub peg_ratio: f64,
    pub book_value: f64,
    pub dividend_per_share: f64,
    pub dividend_yield: f64,
    pub eps: f64,
    #[serde(rename = "revenuePerShareTTM")]
    pub revenue_per_share_ttm: f64,
    pub profit_margin: f64,
    #[serde(rename = "operatingMarginTTM")]
    pub operating_margin_ttm: f64,
    #[serde(rename = "returnOnAssetsTTM")]
    pub return_on_assets_ttm: f64,
    #[serde(rename = "returnOnEquityTTM")]
    pub return_on_equity_ttm: f64,
    #[serde(rename = "revenueTTM")]
    pub revenue_ttm: i64,
    #[serde(rename = "grossProfitTTM")]
    pub gross_profit_ttm: i64,
    #[serde(rename = "dilutedEPSTTM")]
    pub diluted_eps_ttm: f64,
    #[serde(rename = "quarterlyEarningsGrowthYOY")]
    pub quarterly_earnings_growth_yoy: f64,
    #[serde(rename = "quarterlyRevenueGrowthYOY")]
    pub quarterly_revenue_growth_yoy: f64,
    pub analyst_target_price: f64,
    #[serde(rename = "trailingPE")]
    pub trailing_pe: f64,
    #[serde(rename = "forwardPE")]
    pub forward_pe: f64,
    #[serde(rename = "priceToSalesRatioTTM")]
    pub price_to_sales_ratio_ttm: f64,
    pub price_to_book_ratio: f64,
    pub ev_to_revenue: f64,
    #[serde(rename = "evToEBITDA")]
    pub ev_to_ebitda: f64,
    pub beta: f64,
    pub week52_high: f64,
    pub week52_low: f64,
    pub day50_moving_average: f64,
    pub day200_moving_average: f64,
    pub shares_outstanding: i64,
    pub dividend_date: Option<String>,
    pub ex_dividend_date: Option<String>,
}

impl Cacheable for CompanyProfile {
    fn is_cacheable(&self) -> bool {
        !self.symbol.is_empty()
            && self
                .company_name
                .as_deref()
                .is_some_and(|name| !name.is_empty())
    }
}

impl Cacheable for Option<CompanyProfile> {
    fn is_cacheable(&self) -> bool {
        self.as_ref().is_some_and(Cacheable::is_cacheable)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeRecord {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub period: Period,
    pub revenue: i64,
    pub ebitda: i64,
    pub net_income: i64,
    pub eps: f64,
    pub operating_expenses: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowRecord {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub period: Period,
    /// Always `operating_cash_flow - |capital_expenditures|`.
    pub free_cash_flow: i64,
    pub operating_cash_flow: i64,
    pub capital_expenditures: i64,
    /// Reported as an outflow; stored as a positive amount.
    pub dividends_paid: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSheetRecord {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub period: Period,
    pub cash: i64,
    pub total_debt: i64,
    pub short_term_debt: i64,
    pub long_term_debt: i64,
    pub common_stock_shares_outstanding: i64,
    pub total_assets: i64,
    pub total_liabilities: i64,
}

/// Reported vs. estimated EPS.
///
/// `None` on the estimate fields means the provider had no estimate, which is
/// different from a zero surprise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsRecord {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub period: Period,
    pub eps: f64,
    #[serde(rename = "estimatedEPS")]
    pub estimated_eps: Option<f64>,
    pub surprise: Option<f64>,
    pub surprise_percentage: Option<f64>,
    #[serde(
        default,
        with = "iso_date::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub reported_date: Option<Date>,
}

/// One weekly close with its change against the previous point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    /// Split/dividend adjusted close.
    pub close: f64,
    pub volume: i64,
    pub change: f64,
    pub change_percent: f64,
}

impl Cacheable for Vec<PricePoint> {
    fn is_cacheable(&self) -> bool {
        !self.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DividendPayment {
    /// Ex-dividend date.
    #[serde(with = "iso_date")]
    pub date: Date,
    pub dividend_amount: f64,
    #[serde(default, with = "iso_date::option")]
    pub declaration_date: Option<Date>,
    #[serde(default, with = "iso_date::option")]
    pub record_date: Option<Date>,
    #[serde(default, with = "iso_date::option")]
    pub payment_date: Option<Date>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnualDividend {
    pub year: i32,
    pub total_dividend: f64,
    pub dividend_count: u32,
    #[serde(with = "iso_date_list")]
    pub dates: Vec<Date>,
}

/// Dividend history viewed per payment (last five years) and per year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DividendsBundle {
    pub quarterly: Vec<DividendPayment>,
    pub annual: Vec<AnnualDividend>,
}

impl DividendsBundle {
    pub fn is_empty(&self) -> bool {
        self.quarterly.is_empty() && self.annual.is_empty()
    }
}

impl Cacheable for DividendsBundle {
    fn is_cacheable(&self) -> bool {
        !self.is_empty()
    }
}

macro_rules! impl_dated {
    ($($ty:ty),+ $(,)?) => {
        $(impl Dated for $ty {
            fn date(&self) -> Date {
                self.date
            }
        })+
    };
}

impl_dated!(
    IncomeRecord,
    CashFlowRecord,
    BalanceSheetRecord,
    EarningsRecord,
    PricePoint,
    DividendPayment,
);

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn earnings_record_serializes_provider_style_names() {
        let record = EarningsRecord {
            date: date!(2023 - 12 - 31),
            period: Period::Quarter,
            eps: 3.87,
            estimated_eps: Some(3.78),
            surprise: None,
            surprise_percentage: None,
            reported_date: Some(date!(2024 - 01 - 24)),
        };

        let value = serde_json::to_value(&record).expect("serialize");
        assert_eq!(value["date"], "2023-12-31");
        assert_eq!(value["period"], "quarter");
        assert_eq!(value["estimatedEPS"], 3.78);
        assert!(value["surprise"].is_null());
        assert_eq!(value["reportedDate"], "2024-01-24");
    }

    #[test]
    fn annual_earnings_omit_reported_date() {
        let record = EarningsRecord {
            date: date!(2022 - 12 - 31),
            period: Period::Annual,
            eps: 7.0,
            estimated_eps: None,
            surprise: None,
            surprise_percentage: None,
            reported_date: None,
        };

        let value = serde_json::to_value(&record).expect("serialize");
        assert!(value.get("reportedDate").is_none());
    }

    #[test]
    fn profile_without_name_is_not_cacheable() {
        let value = serde_json::json!({
            "symbol": "IBM", "companyName": null, "description": null, "sector": null,
            "industry": null, "exchange": null, "currency": null, "country": null,
            "marketCap": 0, "peRatio": 0.0, "pegRatio": 0.0, "bookValue": 0.0,
            "dividendPerShare": 0.0, "dividendYield": 0.0, "eps": 0.0,
            "revenuePerShareTTM": 0.0, "profitMargin": 0.0, "operatingMarginTTM": 0.0,
            "returnOnAssetsTTM": 0.0, "returnOnEquityTTM": 0.0, "revenueTTM": 0,
            "grossProfitTTM": 0, "dilutedEPSTTM": 0.0, "quarterlyEarningsGrowthYOY": 0.0,
            "quarterlyRevenueGrowthYOY": 0.0, "analystTargetPrice": 0.0, "trailingPE": 0.0,
            "forwardPE": 0.0, "priceToSalesRatioTTM": 0.0, "priceToBookRatio": 0.0,
            "evToRevenue": 0.0, "evToEBITDA": 0.0, "beta": 0.0, "week52High": 0.0,
            "week52Low": 0.0, "day50MovingAverage": 0.0, "day200MovingAverage": 0.0,
            "sharesOutstanding": 0, "dividendDate": null, "exDividendDate": null
        });
        let profile: CompanyProfile = serde_json::from_value(value).expect("deserialize");
        assert!(!profile.is_cacheable());
        assert!(!Some(profile).is_cacheable());
        assert!(!None::<CompanyProfile>.is_cacheable());
    }
}
