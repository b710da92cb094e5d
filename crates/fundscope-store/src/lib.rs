//! # Fundscope Store
//!
//! Persistent, namespaced key-value storage for fundscope.
//!
//! ## Overview
//!
//! Everything fundscope keeps between runs lives in one flat key space:
//!
//! | Key | Value |
//! |-----|-------|
//! | `alpha_vantage_api_key` | The user's provider API key |
//! | `av_<SYMBOL>_<endpoint>` | Cached normalized payload `{data, timestamp}` |
//!
//! Two backends implement [`KvStore`]:
//!
//! - [`DuckDbStore`]: a single `kv_entries` table inside a DuckDB file
//! - [`MemoryStore`]: a process-local map used by tests and `--no-persist` runs
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fundscope_store::{DuckDbStore, KvStore, StoreConfig};
//!
//! fn main() -> Result<(), fundscope_store::StoreError> {
//!     let store = DuckDbStore::open(&StoreConfig::default())?;
//!     store.set("greeting", "hello")?;
//!     assert_eq!(store.get("greeting")?.as_deref(), Some("hello"));
//!     Ok(())
//! }
//! ```

pub mod duckdb;
pub mod memory;

use std::env;
use std::path::PathBuf;

use thiserror::Error;

pub use crate::duckdb::DuckDbStore;
pub use crate::memory::MemoryStore;

/// Errors raised by store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `DuckDB` database error.
    #[error(transparent)]
    DuckDb(#[from] ::duckdb::Error),

    /// I/O error while preparing the store directory.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A lock guarding backend state was poisoned by a panicking thread.
    #[error("store lock poisoned: {0}")]
    Poisoned(&'static str),
}

/// Location of the on-disk store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Root directory for fundscope data.
    pub fundscope_home: PathBuf,
    /// Path to the `DuckDB` database file.
    pub db_path: PathBuf,
    /// Maximum number of idle connections kept around.
    pub max_pool_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::in_home(resolve_fundscope_home())
    }
}

impl StoreConfig {
    /// Build a config rooted at an explicit directory.
    pub fn in_home(fundscope_home: impl Into<PathBuf>) -> Self {
        let fundscope_home = fundscope_home.into();
        let db_path = fundscope_home.join("store.duckdb");
        Self {
            fundscope_home,
            db_path,
            max_pool_size: 2,
        }
    }
}

/// Flat string key-value storage.
///
/// Implementations must be safe to share across tasks; every method takes
/// `&self`.
pub trait KvStore: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Insert or overwrite the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete `key`. Returns whether an entry existed.
    fn remove(&self, key: &str) -> Result<bool, StoreError>;

    /// List every key starting with `prefix`, in ascending order.
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
}

/// Resolve the fundscope data directory.
///
/// `FUNDSCOPE_HOME` wins when set and non-empty, then `$HOME/.fundscope`,
/// then `.fundscope` relative to the working directory.
pub fn resolve_fundscope_home() -> PathBuf {
    if let Some(path) = env::var_os("FUNDSCOPE_HOME") {
        let path = PathBuf::from(path);
        if !path.as_os_str().is_empty() {
            return path;
        }
    }

    if let Some(home) = env::var_os("HOME") {
        return PathBuf::from(home).join(".fundscope");
    }

    PathBuf::from(".fundscope")
}
