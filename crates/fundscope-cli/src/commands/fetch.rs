use std::sync::Arc;

use fundscope_core::{Aggregator, FinancialDataSource, Symbol};

use crate::cli::{FetchArgs, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::CommandOutcome;

pub async fn run(
    args: &FetchArgs,
    source: Arc<dyn FinancialDataSource>,
) -> Result<CommandOutcome, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    let aggregator = Aggregator::new(source);

    let result = aggregator.fetch_all(&symbol, args.timeframe).await?;
    tracing::info!(
        symbol = %symbol,
        search_id = result.search_id,
        failed_endpoints = result.errors.len(),
        "lookup finished"
    );

    let rendered = match args.format {
        OutputFormat::Json => output::to_json(&result, args.pretty)?,
        OutputFormat::Table => output::composite_table(&result),
    };
    let warnings = result
        .errors
        .iter()
        .map(|error| format!("partial data for {symbol}: {error}"));

    Ok(CommandOutcome::new(rendered).with_warnings(warnings))
}
