//! Declarative field mapping.
//!
//! Every numeric output field is described by one [`FieldRule`]: the provider
//! fields to try in order, how to coerce them, and what to use when none of
//! them yields a number. Each normalizer owns one table of rules.

use std::collections::BTreeMap;

use serde_json::Value;

/// How a provider value becomes a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Leading integer prefix, so `"1234.56"` becomes `1234`.
    Integer,
    /// Full decimal parse; non-finite values are rejected.
    Decimal,
}

/// Value used when no source candidate parses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    Zero,
    /// Absent, kept distinct from zero.
    Null,
    /// Sum of these fields, each defaulting to zero.
    SumOf(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub field: &'static str,
    pub sources: &'static [&'static str],
    pub coercion: Coercion,
    pub fallback: Fallback,
}

impl FieldRule {
    pub const fn integer(field: &'static str, sources: &'static [&'static str]) -> Self {
        Self {
            field,
            sources,
            coercion: Coercion::Integer,
            fallback: Fallback::Zero,
        }
    }

    pub const fn decimal(field: &'static str, sources: &'static [&'static str]) -> Self {
        Self {
            field,
            sources,
            coercion: Coercion::Decimal,
            fallback: Fallback::Zero,
        }
    }

    pub const fn or(mut self, fallback: Fallback) -> Self {
        self.fallback = fallback;
        self
    }

    fn resolve(&self, entry: &Value) -> Mapped {
        let found = self
            .sources
            .iter()
            .find_map(|source| coerce(entry.get(source)?, self.coercion));
        if let Some(value) = found {
            return value;
        }

        match self.fallback {
            Fallback::Zero => Mapped::zero(self.coercion),
            Fallback::Null => Mapped::Null,
            Fallback::SumOf(parts) => parts
                .iter()
                .filter_map(|part| coerce(entry.get(part)?, self.coercion))
                .fold(Mapped::zero(self.coercion), Mapped::add),
        }
    }
}

/// One resolved value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mapped {
    Int(i64),
    Decimal(f64),
    Null,
}

impl Mapped {
    const fn zero(coercion: Coercion) -> Self {
        match coercion {
            Coercion::Integer => Self::Int(0),
            Coercion::Decimal => Self::Decimal(0.0),
        }
    }

    fn add(self, other: Self) -> Self {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Self::Int(a.saturating_add(b)),
            (a, b) => Self::Decimal(a.as_f64().unwrap_or(0.0) + b.as_f64().unwrap_or(0.0)),
        }
    }

    fn as_f64(self) -> Option<f64> {
        match self {
            Self::Int(value) => Some(value as f64),
            Self::Decimal(value) => Some(value),
            Self::Null => None,
        }
    }
}

/// Output of applying a rule table to one provider object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappedFields {
    values: BTreeMap<&'static str, Mapped>,
}

impl MappedFields {
    pub fn apply(entry: &Value, rules: &[FieldRule]) -> Self {
        let values = rules
            .iter()
            .map(|rule| (rule.field, rule.resolve(entry)))
            .collect();
        Self { values }
    }

    pub fn get(&self, field: &str) -> Mapped {
        self.values.get(field).copied().unwrap_or(Mapped::Null)
    }

    pub fn int(&self, field: &str) -> i64 {
        match self.get(field) {
            Mapped::Int(value) => value,
            Mapped::Decimal(value) => value as i64,
            Mapped::Null => 0,
        }
    }

    pub fn decimal(&self, field: &str) -> f64 {
        self.get(field).as_f64().unwrap_or(0.0)
    }

    pub fn optional_decimal(&self, field: &str) -> Option<f64> {
        self.get(field).as_f64()
    }
}

fn coerce(value: &Value, coercion: Coercion) -> Option<Mapped> {
    match (value, coercion) {
        (Value::Number(number), Coercion::Integer) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|v| v.is_finite()).map(|v| v as i64))
            .map(Mapped::Int),
        (Value::Number(number), Coercion::Decimal) => number
            .as_f64()
            .filter(|v| v.is_finite())
            .map(Mapped::Decimal),
        (Value::String(text), Coercion::Integer) => parse_integer_prefix(text).map(Mapped::Int),
        (Value::String(text), Coercion::Decimal) => parse_decimal(text).map(Mapped::Decimal),
        _ => None,
    }
}

/// Leading optionally-signed digit run, ignoring surrounding whitespace.
/// `"None"`, `"-"` and `""` yield `None`.
pub fn parse_integer_prefix(text: &str) -> Option<i64> {
    let text = text.trim();
    let sign_len = usize::from(text.starts_with(['-', '+']));
    let digits = text[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits == 0 {
        return None;
    }
    text[..sign_len + digits].parse().ok()
}

pub fn parse_decimal(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const RULES: &[FieldRule] = &[
        FieldRule::integer("cash", &["cashAndCashEquivalents", "cashAndShortTermInvestments"]),
        FieldRule::integer("ebitda", &["ebitda"])
            .or(Fallback::SumOf(&["operatingIncome", "depreciationAmortization"])),
        FieldRule::decimal("estimate", &["estimatedEPS"]).or(Fallback::Null),
        FieldRule::decimal("eps", &["reportedEPS"]),
    ];

    #[test]
    fn integer_prefix_follows_provider_strings() {
        assert_eq!(parse_integer_prefix("1234"), Some(1234));
        assert_eq!(parse_integer_prefix(" -200 "), Some(-200));
        assert_eq!(parse_integer_prefix("1234.99"), Some(1234));
        assert_eq!(parse_integer_prefix("None"), None);
        assert_eq!(parse_integer_prefix("-"), None);
        assert_eq!(parse_integer_prefix(""), None);
    }

    #[test]
    fn decimal_rejects_placeholders() {
        assert_eq!(parse_decimal("3.87"), Some(3.87));
        assert_eq!(parse_decimal("None"), None);
        assert_eq!(parse_decimal("NaN"), None);
        assert_eq!(parse_decimal("inf"), None);
    }

    #[test]
    fn first_parseable_candidate_wins() {
        let fields = MappedFields::apply(
            &json!({"cashAndCashEquivalents": "None", "cashAndShortTermInvestments": "900"}),
            RULES,
        );
        assert_eq!(fields.int("cash"), 900);
    }

    #[test]
    fn sum_fallback_applies_when_direct_field_missing() {
        let fields = MappedFields::apply(
            &json!({"ebitda": "None", "operatingIncome": "700", "depreciationAmortization": "50"}),
            RULES,
        );
        assert_eq!(fields.int("ebitda"), 750);

        let partial = MappedFields::apply(&json!({"operatingIncome": "700"}), RULES);
        assert_eq!(partial.int("ebitda"), 700);
    }

    #[test]
    fn null_fallback_is_distinct_from_zero() {
        let missing = MappedFields::apply(&json!({"reportedEPS": "2.1"}), RULES);
        assert_eq!(missing.optional_decimal("estimate"), None);
        assert_eq!(missing.decimal("eps"), 2.1);

        let zero = MappedFields::apply(&json!({"estimatedEPS": "0"}), RULES);
        assert_eq!(zero.optional_decimal("estimate"), Some(0.0));
    }

    #[test]
    fn missing_fields_default_to_zero() {
        let fields = MappedFields::apply(&json!({}), RULES);
        assert_eq!(fields.int("cash"), 0);
        assert_eq!(fields.decimal("eps"), 0.0);
        assert_eq!(fields.int("unknown"), 0);
    }
}
