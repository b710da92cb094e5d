use fundscope_core::ResponseCache;

use crate::cli::{CacheArgs, CacheCommand};
use crate::error::CliError;
use crate::output;

use super::CommandOutcome;

pub fn run(args: &CacheArgs, cache: &ResponseCache) -> Result<CommandOutcome, CliError> {
    match args.command {
        CacheCommand::Clear => {
            let removed = cache.clear();
            Ok(CommandOutcome::new(format!("removed {removed} cached entries\n")))
        }
        CacheCommand::Info => {
            let entries = cache.inspect();
            if entries.is_empty() {
                return Ok(CommandOutcome::new("cache is empty\n"));
            }
            Ok(CommandOutcome::new(output::cache_table(&entries)))
        }
    }
}
