use serde_json::Value;
use time::Date;

use super::mapping::{Fallback, FieldRule, MappedFields};
use super::{optional_date, split_reports, ReportKeys};
use crate::{EarningsRecord, FetchError, Period, Symbol, TimeSeriesBundle};

const EARNINGS_RULES: &[FieldRule] = &[
    FieldRule::decimal("eps", &["reportedEPS"]),
    FieldRule::decimal("estimatedEPS", &["estimatedEPS"]).or(Fallback::Null),
    FieldRule::decimal("surprise", &["surprise"]).or(Fallback::Null),
    FieldRule::decimal("surprisePercentage", &["surprisePercentage"]).or(Fallback::Null),
];

const KEYS: ReportKeys = ReportKeys {
    annual: "annualEarnings",
    quarterly: "quarterlyEarnings",
    what: "earnings data",
};

/// Normalize an `EARNINGS` body.
///
/// Estimates stay `None` when the provider has none; the report date is
/// only kept on quarterly entries.
pub fn earnings(
    body: &Value,
    symbol: &Symbol,
    today: Date,
) -> Result<TimeSeriesBundle<EarningsRecord>, FetchError> {
    split_reports(body, symbol, today, &KEYS, |entry, date, period| {
        let fields = MappedFields::apply(entry, EARNINGS_RULES);
        EarningsRecord {
            date,
            period,
            eps: fields.decimal("eps"),
            estimated_eps: fields.optional_decimal("estimatedEPS"),
            surprise: fields.optional_decimal("surprise"),
            surprise_percentage: fields.optional_decimal("surprisePercentage"),
            reported_date: match period {
                Period::Quarter => optional_date(entry, "reportedDate"),
                Period::Annual => None,
            },
        }
    })
}
