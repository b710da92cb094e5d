use std::collections::BTreeMap;

use serde_json::Value;
use time::Date;

use super::mapping::{FieldRule, MappedFields};
use super::{ensure_valid_symbol, entry_date, optional_date};
use crate::{within_years, AnnualDividend, DividendPayment, DividendsBundle, FetchError, Symbol};

/// Years of individual payments kept in the per-payment view.
const PAYMENT_LOOKBACK_YEARS: i32 = 5;

const DIVIDEND_RULES: &[FieldRule] = &[FieldRule::decimal("amount", &["amount"])];

/// Normalize a `DIVIDENDS` body.
///
/// Produces the payments of the last five years and per-year totals over
/// the whole history, excluding the current year.
pub fn dividends(body: &Value, symbol: &Symbol, today: Date) -> Result<DividendsBundle, FetchError> {
    ensure_valid_symbol(body, symbol)?;

    let entries = body
        .get("data")
        .and_then(Value::as_array)
        .filter(|entries| !entries.is_empty())
        .ok_or_else(|| FetchError::missing("dividend data", symbol.as_str()))?;

    let mut payments: Vec<DividendPayment> = entries
        .iter()
        .filter_map(|entry| {
            let date = entry_date(entry, "ex_dividend_date")?;
            Some(DividendPayment {
                date,
                dividend_amount: MappedFields::apply(entry, DIVIDEND_RULES).decimal("amount"),
                declaration_date: optional_date(entry, "declaration_date"),
                record_date: optional_date(entry, "record_date"),
                payment_date: optional_date(entry, "payment_date"),
            })
        })
        .collect();
    payments.sort_by_key(|payment| payment.date);

    let annual = annual_totals(&payments, today);
    let quarterly = within_years(&payments, PAYMENT_LOOKBACK_YEARS, today).to_vec();

    Ok(DividendsBundle { quarterly, annual })
}

fn annual_totals(payments: &[DividendPayment], today: Date) -> Vec<AnnualDividend> {
    let mut by_year: BTreeMap<i32, AnnualDividend> = BTreeMap::new();
    for payment in payments {
        let year = payment.date.year();
        let total = by_year.entry(year).or_insert_with(|| AnnualDividend {
            year,
            total_dividend: 0.0,
            dividend_count: 0,
            dates: Vec::new(),
        });
        total.total_dividend += payment.dividend_amount;
        total.dividend_count += 1;
        total.dates.push(payment.date);
    }

    by_year
        .into_values()
        .filter(|total| total.year < today.year())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::date;

    fn payment(ex_date: &str, amount: &str) -> Value {
        json!({
            "ex_dividend_date": ex_date,
            "declaration_date": "None",
            "record_date": ex_date,
            "payment_date": "None",
            "amount": amount
        })
    }

    #[test]
    fn groups_by_year_and_limits_payment_view() {
        let body = json!({
            "symbol": "IBM",
            "data": [
                payment("2024-02-08", "1.66"),
                payment("2023-11-09", "1.66"),
                payment("2023-08-09", "1.66"),
                payment("2018-05-09", "1.57"),
                payment("2018-02-08", "1.50"),
            ]
        });

        let bundle = dividends(&body, &Symbol::parse("IBM").expect("valid"), date!(2024 - 06 - 01))
            .expect("normalized");

        let years: Vec<_> = bundle.annual.iter().map(|a| a.year).collect();
        assert_eq!(years, vec![2018, 2023]);
        let y2018 = &bundle.annual[0];
        assert_eq!(y2018.dividend_count, 2);
        assert!((y2018.total_dividend - 3.07).abs() < 1e-9);
        assert_eq!(y2018.dates, vec![date!(2018 - 02 - 08), date!(2018 - 05 - 09)]);

        let recent: Vec<_> = bundle.quarterly.iter().map(|p| p.date).collect();
        assert_eq!(
            recent,
            vec![date!(2023 - 08 - 09), date!(2023 - 11 - 09), date!(2024 - 02 - 08)]
        );
        assert_eq!(bundle.quarterly[0].declaration_date, None);
        assert_eq!(bundle.quarterly[0].record_date, Some(date!(2023 - 08 - 09)));
    }

    #[test]
    fn empty_history_is_missing_data() {
        let error = dividends(
            &json!({"symbol": "TSLA", "data": []}),
            &Symbol::parse("TSLA").expect("valid"),
            date!(2024 - 06 - 01),
        )
        .expect_err("no dividends");
        assert_eq!(error.to_string(), "no dividend data found for symbol: TSLA");
    }
}
