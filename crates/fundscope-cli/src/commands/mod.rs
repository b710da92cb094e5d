mod cache;
mod config;
mod fetch;

use std::sync::Arc;

use fundscope_core::config::resolve_api_key;
use fundscope_core::{AlphaVantageClient, ApiKeySource, ClientConfig};
use fundscope_store::{DuckDbStore, KvStore, MemoryStore, StoreConfig};

use crate::cli::{Cli, Command};
use crate::error::CliError;

/// What a command hands back to `main` for printing.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Written to stdout.
    pub rendered: String,
    /// Written to stderr, one `warning:` line each.
    pub warnings: Vec<String>,
}

impl CommandOutcome {
    pub fn new(rendered: impl Into<String>) -> Self {
        Self {
            rendered: rendered.into(),
            warnings: Vec::new(),
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_warnings(mut self, warnings: impl IntoIterator<Item = String>) -> Self {
        self.warnings.extend(warnings);
        self
    }
}

/// Shared per-invocation state: the store and the CLI-level overrides.
pub struct Context {
    pub store: Arc<dyn KvStore>,
    pub api_key_flag: Option<String>,
    pub timeout_ms: Option<u64>,
    pub persistent: bool,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let store: Arc<dyn KvStore> = if cli.no_persist {
            Arc::new(MemoryStore::new())
        } else {
            let config = StoreConfig::default();
            let store = DuckDbStore::open(&config)?;
            tracing::debug!(path = %config.db_path.display(), "opened store");
            Arc::new(store)
        };

        Ok(Self {
            store,
            api_key_flag: cli.api_key.clone(),
            timeout_ms: cli.timeout_ms,
            persistent: !cli.no_persist,
        })
    }

    /// Resolve the key and settings, then build a provider client over the store.
    pub fn client(&self) -> Result<(AlphaVantageClient, ApiKeySource), CliError> {
        let (api_key, source) = resolve_api_key(self.api_key_flag.as_deref(), self.store.as_ref())?;
        let mut config = ClientConfig::from_env()?.with_api_key(api_key);
        if let Some(timeout_ms) = self.timeout_ms {
            config = config.with_timeout_ms(timeout_ms);
        }
        tracing::debug!(key = %config.api_key, source = source.as_str(), "resolved API key");

        Ok((AlphaVantageClient::new(config, Arc::clone(&self.store)), source))
    }
}

pub async fn run(cli: &Cli) -> Result<CommandOutcome, CliError> {
    let context = Context::from_cli(cli)?;

    match &cli.command {
        Command::Fetch(args) => {
            let (client, _) = context.client()?;
            fetch::run(args, Arc::new(client)).await
        }
        Command::Cache(args) => {
            let (client, _) = context.client()?;
            cache::run(args, client.cache())
        }
        Command::Config(args) => config::run(args, &context).await,
    }
}
