//! Rendering of command results for the terminal.

use std::fmt::Write as _;
use std::io::Write as _;

use fundscope_core::labels::{format_currency, format_number, format_percent, timeframe_label};
use fundscope_core::{CacheEntryInfo, CompositeResult, Dated, TimeSeriesBundle};
use serde::Serialize;

/// Statement rows shown per section in table output.
const TABLE_ROWS: usize = 4;

pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, serde_json::Error> {
    let mut rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    rendered.push('\n');
    Ok(rendered)
}

pub fn write_stdout(rendered: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(rendered.as_bytes())?;
    stdout.flush()
}

pub fn composite_table(result: &CompositeResult) -> String {
    let annual = result.timeframe.is_annual();
    let mut out = String::new();

    match &result.profile {
        Some(profile) => {
            let name = profile.company_name.as_deref().unwrap_or(&profile.symbol);
            let _ = writeln!(out, "{name} ({})", profile.symbol);
            let sector = profile.sector.as_deref().unwrap_or("N/A");
            let industry = profile.industry.as_deref().unwrap_or("N/A");
            let _ = writeln!(out, "{sector} / {industry}");
            out.push('\n');
            out.push_str(&table(
                &["Market Cap", "P/E", "EPS", "Dividend Yield", "Beta"],
                vec![vec![
                    format_currency(Some(profile.market_cap as f64)),
                    format_number(Some(profile.pe_ratio), 2),
                    format_currency(Some(profile.eps)),
                    format_percent(Some(profile.dividend_yield), 2),
                    format_number(Some(profile.beta), 2),
                ]],
            ));
        }
        None => {
            let _ = writeln!(out, "{} (profile unavailable)", result.symbol);
        }
    }

    if let Some(last) = result.historical_data.last() {
        let _ = writeln!(
            out,
            "\nLast close {} on {}: {} ({} weekly points, {})",
            format_currency(Some(last.close)),
            last.date,
            format_number(Some(last.change_percent), 2) + "%",
            result.historical_data.len(),
            result.timeframe,
        );
    }

    section(
        &mut out,
        "Income Statement",
        &result.income_statement,
        annual,
        &["Revenue", "EBITDA", "Net Income", "EPS"],
        |r| {
            vec![
                format_currency(Some(r.revenue as f64)),
                format_currency(Some(r.ebitda as f64)),
                format_currency(Some(r.net_income as f64)),
                format_number(Some(r.eps), 2),
            ]
        },
    );
    section(
        &mut out,
        "Cash Flow",
        &result.cash_flow_statement,
        annual,
        &["Operating", "CapEx", "Free Cash Flow", "Dividends Paid"],
        |r| {
            vec![
                format_currency(Some(r.operating_cash_flow as f64)),
                format_currency(Some(r.capital_expenditures as f64)),
                format_currency(Some(r.free_cash_flow as f64)),
                format_currency(Some(r.dividends_paid as f64)),
            ]
        },
    );
    section(
        &mut out,
        "Balance Sheet",
        &result.balance_sheet,
        annual,
        &["Cash", "Total Debt", "Total Assets", "Total Liabilities"],
        |r| {
            vec![
                format_currency(Some(r.cash as f64)),
                format_currency(Some(r.total_debt as f64)),
                format_currency(Some(r.total_assets as f64)),
                format_currency(Some(r.total_liabilities as f64)),
            ]
        },
    );
    section(
        &mut out,
        "Earnings",
        &result.earnings_data,
        annual,
        &["EPS", "Estimate", "Surprise", "Surprise %"],
        |r| {
            vec![
                format_number(Some(r.eps), 2),
                format_number(r.estimated_eps, 2),
                format_number(r.surprise, 2),
                // Provider reports this one already in percent.
                format_percent(r.surprise_percentage.map(|p| p / 100.0), 2),
            ]
        },
    );

    if !result.dividends_data.annual.is_empty() {
        let rows = tail(&result.dividends_data.annual)
            .iter()
            .map(|year| {
                vec![
                    year.year.to_string(),
                    format_currency(Some(year.total_dividend)),
                    year.dividend_count.to_string(),
                ]
            })
            .collect();
        let _ = writeln!(out, "\nDividends");
        out.push_str(&table(&["Year", "Total", "Payments"], rows));
    }

    out
}

pub fn cache_table(entries: &[CacheEntryInfo]) -> String {
    let rows = entries
        .iter()
        .map(|entry| {
            vec![
                entry.key.clone(),
                format!("{}h", entry.age_hours),
                format!("{}h", entry.expires_in_hours),
            ]
        })
        .collect();
    table(&["Key", "Age", "Expires In"], rows)
}

fn section<T: Dated>(
    out: &mut String,
    title: &str,
    bundle: &TimeSeriesBundle<T>,
    annual: bool,
    columns: &[&str],
    cells: impl Fn(&T) -> Vec<String>,
) {
    let records = if annual { &bundle.annual } else { &bundle.quarterly };
    if records.is_empty() {
        return;
    }

    let mut headers = vec!["Period"];
    headers.extend_from_slice(columns);
    let rows = tail(records)
        .iter()
        .map(|record| {
            let mut row = vec![timeframe_label(record.date(), annual)];
            row.extend(cells(record));
            row
        })
        .collect();

    let _ = writeln!(out, "\n{title}");
    out.push_str(&table(&headers, rows));
}

fn tail<T>(records: &[T]) -> &[T] {
    &records[records.len().saturating_sub(TABLE_ROWS)..]
}

/// Left-aligned first column, right-aligned numbers.
fn table(headers: &[&str], rows: Vec<Vec<String>>) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header_cells: Vec<String> = headers.iter().map(|h| (*h).to_owned()).collect();
    push_row(&mut out, &header_cells, &widths);
    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    push_row(&mut out, &rule, &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(index, (cell, width))| {
            if index == 0 {
                format!("{cell:<width$}")
            } else {
                format!("{cell:>width$}")
            }
        })
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_pads_columns_to_the_widest_cell() {
        let rendered = table(
            &["Key", "Age"],
            vec![
                vec![String::from("av_IBM_income"), String::from("5h")],
                vec![String::from("av_A_daily"), String::from("12h")],
            ],
        );

        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "Key            Age");
        assert_eq!(lines[1], "-------------  ---");
        assert_eq!(lines[2], "av_IBM_income   5h");
        assert_eq!(lines[3], "av_A_daily     12h");
    }

    #[test]
    fn tail_keeps_the_most_recent_rows() {
        let values = [1, 2, 3, 4, 5, 6];
        assert_eq!(tail(&values), &[3, 4, 5, 6]);
        assert_eq!(tail(&values[..2]), &[1, 2]);
    }

    #[test]
    fn json_output_ends_with_a_newline() {
        let rendered = to_json(&serde_json::json!({"a": 1}), false).expect("json");
        assert_eq!(rendered, "{\"a\":1}\n");
    }
}
