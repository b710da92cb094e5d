//! Calendar helpers shared by normalizers and filters.

use time::macros::format_description;
use time::{Date, Month};

use crate::ValidationError;

/// Parse a provider date such as `2024-09-30`.
pub fn parse_date(value: &str) -> Result<Date, ValidationError> {
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]")).map_err(|_| {
        ValidationError::InvalidDate {
            value: value.to_owned(),
        }
    })
}

pub fn format_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// The same calendar day `years` earlier; Feb 29 falls back to Feb 28.
pub fn years_before(date: Date, years: i32) -> Date {
    let year = date.year() - years;
    date.replace_year(year)
        .or_else(|_| Date::from_calendar_date(year, Month::February, 28))
        .unwrap_or(date)
}

time::serde::format_description!(pub iso_date, Date, "[year]-[month]-[day]");

/// `Vec<Date>` as a list of `YYYY-MM-DD` strings.
pub mod iso_date_list {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use time::Date;

    #[derive(Serialize, Deserialize)]
    #[serde(transparent)]
    struct Day(#[serde(with = "super::iso_date")] Date);

    pub fn serialize<S: Serializer>(dates: &[Date], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(dates.iter().copied().map(Day))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Date>, D::Error> {
        let days = Vec::<Day>::deserialize(deserializer)?;
        Ok(days.into_iter().map(|Day(date)| date).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn parses_and_formats_round_trip() {
        let parsed = parse_date("2023-06-30").expect("valid date");
        assert_eq!(parsed, date!(2023 - 06 - 30));
        assert_eq!(format_date(parsed), "2023-06-30");
    }

    #[test]
    fn rejects_provider_none_marker() {
        assert!(matches!(
            parse_date("None"),
            Err(ValidationError::InvalidDate { .. })
        ));
    }

    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Stamped {
        #[serde(with = "iso_date")]
        day: Date,
        #[serde(default, with = "iso_date::option")]
        maybe: Option<Date>,
        #[serde(with = "iso_date_list")]
        days: Vec<Date>,
    }

    #[test]
    fn serde_adapters_use_iso_strings() {
        let value = Stamped {
            day: date!(2024 - 08 - 09),
            maybe: None,
            days: vec![date!(2023 - 02 - 09), date!(2023 - 11 - 09)],
        };

        let json = serde_json::to_value(&value).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({"day": "2024-08-09", "maybe": null, "days": ["2023-02-09", "2023-11-09"]})
        );

        let parsed: Stamped =
            serde_json::from_str(r#"{"day": "2024-08-09", "days": []}"#).expect("deserialize");
        assert_eq!(parsed.maybe, None);
        assert!(serde_json::from_str::<Stamped>(r#"{"day": "08/09/2024", "days": []}"#).is_err());
    }

    #[test]
    fn leap_day_clamps_to_end_of_february() {
        assert_eq!(years_before(date!(2024 - 02 - 29), 5), date!(2019 - 02 - 28));
        assert_eq!(years_before(date!(2024 - 10 - 16), 20), date!(2004 - 10 - 16));
    }
}
