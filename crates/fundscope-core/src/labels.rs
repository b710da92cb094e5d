//! Display helpers for chart axes and tables.

use time::Date;

const NOT_AVAILABLE: &str = "N/A";

/// `Q<n> <year>` for the calendar quarter containing `date`.
pub fn quarter_label(date: Date) -> String {
    let quarter = (u8::from(date.month()) - 1) / 3 + 1;
    format!("Q{quarter} {}", date.year())
}

pub fn annual_label(date: Date) -> String {
    date.year().to_string()
}

pub fn timeframe_label(date: Date, annual: bool) -> String {
    if annual {
        annual_label(date)
    } else {
        quarter_label(date)
    }
}

/// `1234.5` → `1,234.50`; `None` → `N/A`.
pub fn format_number(value: Option<f64>, decimals: usize) -> String {
    match value.filter(|value| value.is_finite()) {
        Some(value) => group_thousands(value, decimals),
        None => String::from(NOT_AVAILABLE),
    }
}

/// US-dollar amount with two decimals: `-1234.5` → `-$1,234.50`.
pub fn format_currency(value: Option<f64>) -> String {
    match value.filter(|value| value.is_finite()) {
        Some(value) if value < 0.0 => format!("-${}", group_thousands(-value, 2)),
        Some(value) => format!("${}", group_thousands(value, 2)),
        None => String::from(NOT_AVAILABLE),
    }
}

/// Ratio as a percentage: `0.1534` → `15.34%`.
pub fn format_percent(value: Option<f64>, decimals: usize) -> String {
    match value.filter(|value| value.is_finite()) {
        Some(value) => format!("{}%", group_thousands(value * 100.0, decimals)),
        None => String::from(NOT_AVAILABLE),
    }
}

fn group_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (integer, fraction) = match formatted.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && formatted.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };
    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}
