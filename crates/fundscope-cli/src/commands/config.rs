use fundscope_core::config::{reset_api_key, resolve_api_key, save_api_key};
use fundscope_core::ApiKey;
use serde::Serialize;

use crate::cli::{ConfigArgs, ConfigCommand};
use crate::error::CliError;
use crate::output;

use super::{CommandOutcome, Context};

#[derive(Debug, Serialize)]
struct KeyStatus {
    api_key: String,
    source: &'static str,
    demo: bool,
}

pub async fn run(args: &ConfigArgs, context: &Context) -> Result<CommandOutcome, CliError> {
    match &args.command {
        ConfigCommand::SetKey { key } => {
            let key = ApiKey::new(key.as_str())?;
            save_api_key(context.store.as_ref(), &key)?;
            let outcome = CommandOutcome::new(format!("saved API key {key}\n"));
            if context.persistent {
                Ok(outcome)
            } else {
                Ok(outcome.with_warning("--no-persist is set; the key is forgotten when this run exits"))
            }
        }
        ConfigCommand::ResetKey => {
            let message = if reset_api_key(context.store.as_ref())? {
                "removed the saved API key; the demo key is active unless one is set in the environment\n"
            } else {
                "no saved API key\n"
            };
            Ok(CommandOutcome::new(message))
        }
        ConfigCommand::Show => {
            let (key, source) =
                resolve_api_key(context.api_key_flag.as_deref(), context.store.as_ref())?;
            let status = KeyStatus {
                api_key: key.masked(),
                source: source.as_str(),
                demo: key.is_demo(),
            };
            Ok(CommandOutcome::new(output::to_json(&status, true)?))
        }
        ConfigCommand::Verify => {
            let (client, source) = context.client()?;
            client.verify_api_key().await?;
            Ok(CommandOutcome::new(format!(
                "API key {} ({}) is valid\n",
                client.config().api_key,
                source.as_str()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use fundscope_store::{KvStore, MemoryStore};
    use serde_json::Value;

    fn context(store: Arc<MemoryStore>, flag: Option<&str>) -> Context {
        Context {
            store,
            api_key_flag: flag.map(str::to_owned),
            timeout_ms: None,
            persistent: true,
        }
    }

    fn config(command: ConfigCommand) -> ConfigArgs {
        ConfigArgs { command }
    }

    #[tokio::test]
    async fn set_key_persists_and_never_echoes_the_key() {
        let store = Arc::new(MemoryStore::new());
        let outcome = run(
            &config(ConfigCommand::SetKey {
                key: String::from("  ABCD1234  "),
            }),
            &context(store.clone(), None),
        )
        .await
        .expect("set key");

        assert_eq!(
            store.get("alpha_vantage_api_key").expect("read").as_deref(),
            Some("ABCD1234")
        );
        assert_eq!(outcome.rendered, "saved API key ****1234\n");
        assert!(outcome.warnings.is_empty());
    }

    #[tokio::test]
    async fn blank_key_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let error = run(
            &config(ConfigCommand::SetKey {
                key: String::from("   "),
            }),
            &context(store.clone(), None),
        )
        .await
        .expect_err("blank key");

        assert_eq!(error.exit_code(), 2);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn reset_key_reports_whether_a_key_was_saved() {
        let store = Arc::new(MemoryStore::new());
        store.set("alpha_vantage_api_key", "ABCD1234").expect("seed");

        let first = run(&config(ConfigCommand::ResetKey), &context(store.clone(), None))
            .await
            .expect("reset");
        let second = run(&config(ConfigCommand::ResetKey), &context(store.clone(), None))
            .await
            .expect("reset");

        assert!(first.rendered.starts_with("removed the saved API key"));
        assert_eq!(second.rendered, "no saved API key\n");
    }

    #[tokio::test]
    async fn show_prefers_the_flag_and_masks_it() {
        let store = Arc::new(MemoryStore::new());
        let outcome = run(
            &config(ConfigCommand::Show),
            &context(store, Some("FLAGKEY99")),
        )
        .await
        .expect("show");

        let value: Value = serde_json::from_str(&outcome.rendered).expect("json");
        assert_eq!(value["api_key"], "****EY99");
        assert_eq!(value["source"], "flag");
        assert_eq!(value["demo"], false);
    }
}
