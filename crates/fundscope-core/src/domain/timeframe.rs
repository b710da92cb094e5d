use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::Date;

use super::calendar::years_before;
use super::models::Dated;
use crate::ValidationError;

/// Which slice of the price history a view shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeframe {
    /// The last 5 years.
    #[default]
    Quarterly,
    /// The last 20 years.
    Annual,
}

impl Timeframe {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quarterly => "quarterly",
            Self::Annual => "annual",
        }
    }

    pub const fn lookback_years(self) -> i32 {
        match self {
            Self::Quarterly => 5,
            Self::Annual => 20,
        }
    }

    pub const fn is_annual(self) -> bool {
        matches!(self, Self::Annual)
    }
}

impl Display for Timeframe {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "quarterly" | "quarter" => Ok(Self::Quarterly),
            "annual" | "yearly" => Ok(Self::Annual),
            _ => Err(ValidationError::InvalidTimeframe {
                value: value.to_owned(),
            }),
        }
    }
}

/// The suffix of an ascending `series` dated no earlier than `years` before
/// `today`.
pub fn within_years<T: Dated>(series: &[T], years: i32, today: Date) -> &[T] {
    let cutoff = years_before(today, years);
    let start = series.partition_point(|item| item.date() < cutoff);
    &series[start..]
}

/// Re-slice a full price history for a timeframe without refetching.
pub fn filter_history<T: Dated + Clone>(series: &[T], timeframe: Timeframe, today: Date) -> Vec<T> {
    within_years(series, timeframe.lookback_years(), today).to_vec()
}
