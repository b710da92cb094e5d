use serde_json::Value;

use super::ensure_valid_symbol;
use super::mapping::{FieldRule, MappedFields};
use crate::{CompanyProfile, FetchError, Symbol};

const PROFILE_RULES: &[FieldRule] = &[
    FieldRule::integer("marketCap", &["MarketCapitalization"]),
    FieldRule::decimal("peRatio", &["PERatio"]),
    FieldRule::decimal("pegRatio", &["PEGRatio"]),
    FieldRule::decimal("bookValue", &["BookValue"]),
    FieldRule::decimal("dividendPerShare", &["DividendPerShare"]),
    FieldRule::decimal("dividendYield", &["DividendYield"]),
    FieldRule::decimal("eps", &["EPS"]),
    FieldRule::decimal("revenuePerShareTTM", &["RevenuePerShareTTM"]),
    FieldRule::decimal("profitMargin", &["ProfitMargin"]),
    FieldRule::decimal("operatingMarginTTM", &["OperatingMarginTTM"]),
    FieldRule::decimal("returnOnAssetsTTM", &["ReturnOnAssetsTTM"]),
    FieldRule::decimal("returnOnEquityTTM", &["ReturnOnEquityTTM"]),
    FieldRule::integer("revenueTTM", &["RevenueTTM"]),
    FieldRule::integer("grossProfitTTM", &["GrossProfitTTM"]),
    FieldRule::decimal("dilutedEPSTTM", &["DilutedEPSTTM"]),
    FieldRule::decimal("quarterlyEarningsGrowthYOY", &["QuarterlyEarningsGrowthYOY"]),
    FieldRule::decimal("quarterlyRevenueGrowthYOY", &["QuarterlyRevenueGrowthYOY"]),
    FieldRule::decimal("analystTargetPrice", &["AnalystTargetPrice"]),
    FieldRule::decimal("trailingPE", &["TrailingPE"]),
    FieldRule::decimal("forwardPE", &["ForwardPE"]),
    FieldRule::decimal("priceToSalesRatioTTM", &["PriceToSalesRatioTTM"]),
    FieldRule::decimal("priceToBookRatio", &["PriceToBookRatio"]),
    FieldRule::decimal("evToRevenue", &["EVToRevenue"]),
    FieldRule::decimal("evToEBITDA", &["EVToEBITDA"]),
    FieldRule::decimal("beta", &["Beta"]),
    FieldRule::decimal("week52High", &["52WeekHigh"]),
    FieldRule::decimal("week52Low", &["52WeekLow"]),
    FieldRule::decimal("day50MovingAverage", &["50DayMovingAverage"]),
    FieldRule::decimal("day200MovingAverage", &["200DayMovingAverage"]),
    FieldRule::integer("sharesOutstanding", &["SharesOutstanding"]),
];

/// Normalize an `OVERVIEW` body. A body without `Symbol` is missing data.
pub fn company_profile(body: &Value, symbol: &Symbol) -> Result<CompanyProfile, FetchError> {
    ensure_valid_symbol(body, symbol)?;

    let reported_symbol = text(body, "Symbol")
        .ok_or_else(|| FetchError::missing("company profile", symbol.as_str()))?;
    let fields = MappedFields::apply(body, PROFILE_RULES);

    Ok(CompanyProfile {
        symbol: reported_symbol,
        company_name: text(body, "Name"),
        description: text(body, "Description"),
        sector: text(body, "Sector"),
        industry: text(body, "Industry"),
        exchange: text(body, "Exchange"),
        currency: text(body, "Currency"),
        country: text(body, "Country"),
        market_cap: fields.int("marketCap"),
        pe_ratio: fields.decimal("peRatio"),
        peg_ratio: fields.decimal("pegRatio"),
        book_value: fields.decimal("bookValue"),
        dividend_per_share: fields.decimal("dividendPerShare"),
        dividend_yield: fields.decimal("dividendYield"),
        eps: fields.decimal("eps"),
        revenue_per_share_ttm: fields.decimal("revenuePerShareTTM"),
        profit_margin: fields.decimal("profitMargin"),
        operating_margin_ttm: fields.decimal("operatingMarginTTM"),
        return_on_assets_ttm: fields.decimal("returnOnAssetsTTM"),
        return_on_equity_ttm: fields.decimal("returnOnEquityTTM"),
        revenue_ttm: fields.int("revenueTTM"),
        gross_profit_ttm: fields.int("grossProfitTTM"),
        diluted_eps_ttm: fields.decimal("dilutedEPSTTM"),
        quarterly_earnings_growth_yoy: fields.decimal("quarterlyEarningsGrowthYOY"),
        quarterly_revenue_growth_yoy: fields.decimal("quarterlyRevenueGrowthYOY"),
        analyst_target_price: fields.decimal("analystTargetPrice"),
        trailing_pe: fields.decimal("trailingPE"),
        forward_pe: fields.decimal("forwardPE"),
        price_to_sales_ratio_ttm: fields.decimal("priceToSalesRatioTTM"),
        price_to_book_ratio: fields.decimal("priceToBookRatio"),
        ev_to_revenue: fields.decimal("evToRevenue"),
        ev_to_ebitda: fields.decimal("evToEBITDA"),
        beta: fields.decimal("beta"),
        week52_high: fields.decimal("week52High"),
        week52_low: fields.decimal("week52Low"),
        day50_moving_average: fields.decimal("day50MovingAverage"),
        day200_moving_average: fields.decimal("day200MovingAverage"),
        shares_outstanding: fields.int("sharesOutstanding"),
        dividend_date: text(body, "DividendDate"),
        ex_dividend_date: text(body, "ExDividendDate"),
    })
}

fn text(body: &Value, field: &str) -> Option<String> {
    body.get(field)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}
