use serde_json::Value;
use time::Date;

use super::mapping::{Fallback, FieldRule, MappedFields};
use super::{split_reports, ReportKeys};
use crate::{
    BalanceSheetRecord, CashFlowRecord, FetchError, IncomeRecord, Symbol, TimeSeriesBundle,
};

const REPORTS: (&str, &str) = ("annualReports", "quarterlyReports");

const INCOME_RULES: &[FieldRule] = &[
    FieldRule::integer("revenue", &["totalRevenue"]),
    FieldRule::integer("ebitda", &["ebitda"])
        .or(Fallback::SumOf(&["operatingIncome", "depreciationAmortization"])),
    FieldRule::integer("netIncome", &["netIncome"]),
    FieldRule::decimal("eps", &["reportedEPS"]),
    FieldRule::integer("operatingExpenses", &["totalOperatingExpense"]),
];

const CASH_FLOW_RULES: &[FieldRule] = &[
    FieldRule::integer("operatingCashFlow", &["operatingCashflow"]),
    FieldRule::integer("capitalExpenditures", &["capitalExpenditures"]),
    FieldRule::integer("dividendsPaid", &["dividendPayout"]),
];

const BALANCE_SHEET_RULES: &[FieldRule] = &[
    FieldRule::integer(
        "cash",
        &[
            "cashAndCashEquivalentsAtCarryingValue",
            "cashAndShortTermInvestments",
        ],
    ),
    FieldRule::integer("shortTermDebt", &["shortTermDebt"]),
    FieldRule::integer("longTermDebt", &["longTermDebt"]),
    FieldRule::integer(
        "commonStockSharesOutstanding",
        &["commonStockSharesOutstanding"],
    ),
    FieldRule::integer("totalAssets", &["totalAssets"]),
    FieldRule::integer("totalLiabilities", &["totalLiabilities"]),
];

fn keys(what: &'static str) -> ReportKeys {
    ReportKeys {
        annual: REPORTS.0,
        quarterly: REPORTS.1,
        what,
    }
}

/// Normalize an `INCOME_STATEMENT` body.
pub fn income_statement(
    body: &Value,
    symbol: &Symbol,
    today: Date,
) -> Result<TimeSeriesBundle<IncomeRecord>, FetchError> {
    split_reports(body, symbol, today, &keys("income statement data"), |entry, date, period| {
        let fields = MappedFields::apply(entry, INCOME_RULES);
        IncomeRecord {
            date,
            period,
            revenue: fields.int("revenue"),
            ebitda: fields.int("ebitda"),
            net_income: fields.int("netIncome"),
            eps: fields.decimal("eps"),
            operating_expenses: fields.int("operatingExpenses"),
        }
    })
}

/// Normalize a `CASH_FLOW` body. Free cash flow is always derived.
pub fn cash_flow_statement(
    body: &Value,
    symbol: &Symbol,
    today: Date,
) -> Result<TimeSeriesBundle<CashFlowRecord>, FetchError> {
    split_reports(body, symbol, today, &keys("cash flow data"), |entry, date, period| {
        let fields = MappedFields::apply(entry, CASH_FLOW_RULES);
        let operating_cash_flow = fields.int("operatingCashFlow");
        let capital_expenditures = fields.int("capitalExpenditures");
        CashFlowRecord {
            date,
            period,
            free_cash_flow: operating_cash_flow.saturating_sub(capital_expenditures.saturating_abs()),
            operating_cash_flow,
            capital_expenditures,
            dividends_paid: fields.int("dividendsPaid").saturating_abs(),
        }
    })
}

/// Normalize a `BALANCE_SHEET` body.
pub fn balance_sheet(
    body: &Value,
    symbol: &Symbol,
    today: Date,
) -> Result<TimeSeriesBundle<BalanceSheetRecord>, FetchError> {
    split_reports(body, symbol, today, &keys("balance sheet data"), |entry, date, period| {
        let fields = MappedFields::apply(entry, BALANCE_SHEET_RULES);
        let short_term_debt = fields.int("shortTermDebt");
        let long_term_debt = fields.int("longTermDebt");
        BalanceSheetRecord {
            date,
            period,
            cash: fields.int("cash"),
            total_debt: short_term_debt.saturating_add(long_term_debt),
            short_term_debt,
            long_term_debt,
            common_stock_shares_outstanding: fields.int("commonStockSharesOutstanding"),
            total_assets: fields.int("totalAssets"),
            total_liabilities: fields.int("totalLiabilities"),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Period;
    use serde_json::json;
    use time::macros::date;

    fn ibm() -> Symbol {
        Symbol::parse("IBM").expect("valid")
    }

    #[test]
    fn ebitda_falls_back_to_operating_income_plus_depreciation() {
        let body = json!({
            "annualReports": [{
                "fiscalDateEnding": "2022-12-31",
                "totalRevenue": "60530000000",
                "ebitda": "None",
                "operatingIncome": "6500",
                "depreciationAmortization": "500",
                "netIncome": "1640000000",
                "reportedEPS": "1.8",
                "totalOperatingExpense": "25000"
            }],
            "quarterlyReports": []
        });

        let bundle = income_statement(&body, &ibm(), date!(2024 - 05 - 01)).expect("normalized");
        let record = &bundle.annual[0];
        assert_eq!(record.ebitda, 7_000);
        assert_eq!(record.revenue, 60_530_000_000);
        assert_eq!(record.period, Period::Annual);
        assert!(bundle.quarterly.is_empty());
    }

    #[test]
    fn dividends_paid_is_positive_and_capex_is_kept_as_reported() {
        let body = json!({
            "annualReports": [],
            "quarterlyReports": [{
                "fiscalDateEnding": "2024-03-31",
                "operatingCashflow": "4000",
                "capitalExpenditures": "-1000",
                "dividendPayout": "-1500"
            }]
        });

        let bundle = cash_flow_statement(&body, &ibm(), date!(2024 - 05 - 01)).expect("normalized");
        let record = &bundle.quarterly[0];
        assert_eq!(record.free_cash_flow, 3_000);
        assert_eq!(record.capital_expenditures, -1_000);
        assert_eq!(record.dividends_paid, 1_500);
    }

    #[test]
    fn balance_sheet_totals_debt_and_falls_back_for_cash() {
        let body = json!({
            "quarterlyReports": [{
                "fiscalDateEnding": "2024-03-31",
                "cashAndShortTermInvestments": "12000",
                "shortTermDebt": "300",
                "longTermDebt": "None",
                "totalAssets": "90000",
                "totalLiabilities": "70000",
                "commonStockSharesOutstanding": "918000000"
            }]
        });

        let bundle = balance_sheet(&body, &ibm(), date!(2024 - 05 - 01)).expect("normalized");
        let record = &bundle.quarterly[0];
        assert_eq!(record.cash, 12_000);
        assert_eq!(record.total_debt, 300);
        assert_eq!(record.long_term_debt, 0);
        assert_eq!(record.common_stock_shares_outstanding, 918_000_000);
    }

    #[test]
    fn body_without_reports_is_missing_data() {
        let error = balance_sheet(&json!({}), &ibm(), date!(2024 - 05 - 01))
            .expect_err("no report arrays");
        assert_eq!(
            error.to_string(),
            "no balance sheet data found for symbol: IBM"
        );
    }

    #[test]
    fn entries_with_bad_dates_are_skipped() {
        let body = json!({
            "annualReports": [
                {"fiscalDateEnding": "not-a-date", "totalRevenue": "1"},
                {"fiscalDateEnding": "2021-12-31", "totalRevenue": "2"}
            ]
        });

        let bundle = income_statement(&body, &ibm(), date!(2024 - 05 - 01)).expect("normalized");
        assert_eq!(bundle.annual.len(), 1);
        assert_eq!(bundle.annual[0].revenue, 2);
    }
}
