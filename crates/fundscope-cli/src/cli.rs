//! CLI argument definitions for fundscope.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `fetch` | Look up one ticker across every fundamentals endpoint |
//! | `cache` | Inspect or clear cached provider responses |
//! | `config` | Manage the Alpha Vantage API key |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--api-key` | unset | Key for this invocation only |
//! | `--timeout-ms` | `30000` | Request timeout in ms |
//! | `--no-persist` | `false` | Use an in-memory store |
//!
//! # Examples
//!
//! ```bash
//! # Quarterly view of IBM (works with the demo key)
//! fundscope fetch IBM --format table
//!
//! # Twenty years of prices as pretty JSON
//! fundscope fetch MSFT --timeframe annual --pretty
//!
//! # Store a key for later runs
//! fundscope config set-key ABCD1234
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use fundscope_core::Timeframe;

/// Company fundamentals from Alpha Vantage, normalized and cached.
#[derive(Debug, Parser)]
#[command(
    name = "fundscope",
    author,
    version,
    about = "Company fundamentals from Alpha Vantage",
    long_about = "fundscope fetches a company's profile, weekly prices, income statement, \
cash flow, balance sheet, earnings and dividends from Alpha Vantage, normalizes them \
into ascending series and caches each endpoint for 24 hours.\n\
\n\
Use 'fundscope <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Alpha Vantage API key for this invocation.
    ///
    /// Overrides the environment and the persisted key.
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Request timeout in milliseconds. Defaults to FUNDSCOPE_TIMEOUT_MS or 30000.
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_ms: Option<u64>,

    /// Keep the cache and the API key in memory for this run only.
    #[arg(long, global = true, default_value_t = false)]
    pub no_persist: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON object output.
    Json,
    /// Plain-text tables for terminal display.
    Table,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch every fundamentals endpoint for a ticker.
    Fetch(FetchArgs),
    /// Cache management commands.
    Cache(CacheArgs),
    /// API key management commands.
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Ticker symbol, e.g. IBM or BRK-B.
    pub symbol: String,

    /// Price history window: quarterly (5 years) or annual (20 years).
    #[arg(long, default_value_t = Timeframe::Quarterly, value_parser = str::parse::<Timeframe>)]
    pub timeframe: Timeframe,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, default_value_t = false)]
    pub pretty: bool,
}

#[derive(Debug, Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommand,
}

/// Cache management subcommands.
#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// Remove every cached response. The API key is kept.
    Clear,
    /// List cached entries with their age and remaining lifetime.
    Info,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// API key subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Persist an API key for later runs.
    SetKey {
        /// The key issued by Alpha Vantage.
        key: String,
    },
    /// Forget the persisted key and fall back to `demo`.
    ResetKey,
    /// Show which key is active (masked) and where it came from.
    Show,
    /// Send one test request with the active key.
    Verify,
}
