use serde_json::Value;

use super::mapping::{FieldRule, MappedFields};
use super::{ensure_valid_symbol, logged_date};
use crate::{FetchError, PricePoint, Symbol};

const SERIES_KEY: &str = "Weekly Adjusted Time Series";

const PRICE_RULES: &[FieldRule] = &[
    FieldRule::decimal("open", &["1. open"]),
    FieldRule::decimal("high", &["2. high"]),
    FieldRule::decimal("low", &["3. low"]),
    FieldRule::decimal("close", &["5. adjusted close", "4. close"]),
    FieldRule::integer("volume", &["6. volume", "5. volume"]),
];

/// Normalize a `TIME_SERIES_WEEKLY_ADJUSTED` body into an ascending series.
///
/// The first point's change is zero; every later point is compared with its
/// predecessor, with a zero percentage when the previous close is not
/// positive.
pub fn historical_prices(body: &Value, symbol: &Symbol) -> Result<Vec<PricePoint>, FetchError> {
    ensure_valid_symbol(body, symbol)?;

    let series = body
        .get(SERIES_KEY)
        .and_then(Value::as_object)
        .ok_or_else(|| FetchError::missing("historical data", symbol.as_str()))?;

    let mut points: Vec<PricePoint> = series
        .iter()
        .filter_map(|(raw_date, values)| {
            let date = logged_date(raw_date)?;
            let fields = MappedFields::apply(values, PRICE_RULES);
            Some(PricePoint {
                date,
                open: fields.decimal("open"),
                high: fields.decimal("high"),
                low: fields.decimal("low"),
                close: fields.decimal("close"),
                volume: fields.int("volume"),
                change: 0.0,
                change_percent: 0.0,
            })
        })
        .collect();
    points.sort_by_key(|point| point.date);

    for index in 1..points.len() {
        let previous_close = points[index - 1].close;
        let point = &mut points[index];
        point.change = point.close - previous_close;
        point.change_percent = if previous_close > 0.0 {
            point.change / previous_close * 100.0
        } else {
            0.0
        };
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::date;

    fn week(close: &str) -> Value {
        json!({
            "1. open": "10.0",
            "2. high": "12.0",
            "3. low": "9.5",
            "4. close": "11.0",
            "5. adjusted close": close,
            "6. volume": "123456",
            "7. dividend amount": "0.0000"
        })
    }

    #[test]
    fn series_is_sorted_and_changes_are_computed() {
        let body = json!({
            "Meta Data": {"2. Symbol": "IBM"},
            "Weekly Adjusted Time Series": {
                "2024-01-19": week("110.0"),
                "2024-01-05": week("100.0"),
                "2024-01-12": week("0"),
            }
        });

        let points = historical_prices(&body, &Symbol::parse("IBM").expect("valid"))
            .expect("normalized");

        let dates: Vec<_> = points.iter().map(|p| p.date).collect();
        assert_eq!(
            dates,
            vec![date!(2024 - 01 - 05), date!(2024 - 01 - 12), date!(2024 - 01 - 19)]
        );
        assert_eq!(points[0].change, 0.0);
        assert_eq!(points[0].change_percent, 0.0);
        assert_eq!(points[1].change, -100.0);
        assert_eq!(points[1].change_percent, -100.0);
        // previous close of zero
        assert_eq!(points[2].change, 110.0);
        assert_eq!(points[2].change_percent, 0.0);
        assert_eq!(points[2].volume, 123_456);
    }

    #[test]
    fn missing_series_is_missing_data() {
        let error = historical_prices(&json!({"Meta Data": {}}), &Symbol::parse("IBM").expect("valid"))
            .expect_err("no series");
        assert_eq!(error.to_string(), "no historical data found for symbol: IBM");
    }
}
