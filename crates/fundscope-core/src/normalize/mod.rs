//! # Endpoint Normalizers
//!
//! Pure functions from one raw provider body to a canonical record or bundle.
//! Callers run rate-limit detection first; normalizers only see bodies that
//! are not throttling notices.
//!
//! Shared rules for statement-style reports:
//!
//! - entries are sorted ascending by date, whatever order the provider used
//! - annual series drop every entry in or after the current calendar year
//! - quarterly series keep the [`QUARTERLY_LIMIT`] most recent entries
//! - entries whose date cannot be parsed are skipped

mod dividends;
mod earnings;
pub mod mapping;
mod prices;
mod profile;
mod statements;

use serde_json::Value;
use time::Date;

use crate::{parse_date, Dated, FetchError, Period, Symbol, TimeSeriesBundle};

pub use dividends::dividends;
pub use earnings::earnings;
pub use prices::historical_prices;
pub use profile::company_profile;
pub use statements::{balance_sheet, cash_flow_statement, income_statement};

/// Most recent quarterly entries kept per series (five years).
pub const QUARTERLY_LIMIT: usize = 20;

/// Fail with [`FetchError::InvalidSymbol`] when the provider flagged the
/// symbol as unknown.
pub fn ensure_valid_symbol(body: &Value, symbol: &Symbol) -> Result<(), FetchError> {
    if body.get("Error Message").is_some() {
        return Err(FetchError::InvalidSymbol {
            symbol: symbol.to_string(),
        });
    }
    Ok(())
}

/// Report array names of one statement-style payload.
pub(crate) struct ReportKeys {
    pub annual: &'static str,
    pub quarterly: &'static str,
    /// Used in the missing-data message.
    pub what: &'static str,
}

/// Split a statement-style body into an annual and a quarterly series.
///
/// Fails only when neither report array is present.
pub(crate) fn split_reports<T, F>(
    body: &Value,
    symbol: &Symbol,
    today: Date,
    keys: &ReportKeys,
    map: F,
) -> Result<TimeSeriesBundle<T>, FetchError>
where
    T: Dated,
    F: Fn(&Value, Date, Period) -> T,
{
    ensure_valid_symbol(body, symbol)?;

    let annual = body.get(keys.annual).and_then(Value::as_array);
    let quarterly = body.get(keys.quarterly).and_then(Value::as_array);
    if annual.is_none() && quarterly.is_none() {
        return Err(FetchError::missing(keys.what, symbol.as_str()));
    }

    let collect = |entries: Option<&Vec<Value>>, period: Period| -> Vec<T> {
        let mut records: Vec<T> = entries
            .into_iter()
            .flatten()
            .filter_map(|entry| {
                let date = entry_date(entry, "fiscalDateEnding")?;
                Some(map(entry, date, period))
            })
            .collect();
        records.sort_by_key(Dated::date);
        records
    };

    Ok(TimeSeriesBundle {
        annual: completed_years(collect(annual, Period::Annual), today),
        quarterly: most_recent(collect(quarterly, Period::Quarter), QUARTERLY_LIMIT),
    })
}

/// Drop entries dated in the current (incomplete) calendar year or later.
pub(crate) fn completed_years<T: Dated>(mut series: Vec<T>, today: Date) -> Vec<T> {
    series.retain(|record| record.date().year() < today.year());
    series
}

/// Keep the last `limit` entries of an ascending series.
pub(crate) fn most_recent<T>(mut series: Vec<T>, limit: usize) -> Vec<T> {
    let excess = series.len().saturating_sub(limit);
    series.drain(..excess);
    series
}

/// Parse the date under `field`, logging and skipping malformed entries.
pub(crate) fn entry_date(entry: &Value, field: &str) -> Option<Date> {
    entry.get(field).and_then(Value::as_str).and_then(logged_date)
}

pub(crate) fn logged_date(raw: &str) -> Option<Date> {
    match parse_date(raw) {
        Ok(date) => Some(date),
        Err(error) => {
            tracing::debug!(%error, "skipping entry with unparseable date");
            None
        }
    }
}

/// Optional provider date where `"None"` means absent.
pub(crate) fn optional_date(entry: &Value, field: &str) -> Option<Date> {
    entry
        .get(field)
        .and_then(Value::as_str)
        .filter(|raw| *raw != "None")
        .and_then(|raw| parse_date(raw).ok())
}
