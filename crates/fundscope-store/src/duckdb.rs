//! `DuckDB`-backed key-value store.

use std::fs;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use ::duckdb::{params, Connection};

use crate::{KvStore, StoreConfig, StoreError};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS kv_entries (
    key VARCHAR PRIMARY KEY,
    value VARCHAR NOT NULL,
    updated_at BIGINT NOT NULL
);";

/// Key-value store persisted in a single `DuckDB` table.
pub struct DuckDbStore {
    pool: ConnectionPool,
}

impl DuckDbStore {
    /// Open (creating if needed) the store described by `config`.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created or the database
    /// cannot be opened and migrated.
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        if let Some(parent) = config.db_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let connection = Connection::open(&config.db_path)?;
        Self::from_connection(
            connection,
            Some(config.db_path.clone()),
            config.max_pool_size,
        )
    }

    /// Open a throwaway in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?, None, 1)
    }

    fn from_connection(
        connection: Connection,
        db_path: Option<PathBuf>,
        max_idle: usize,
    ) -> Result<Self, StoreError> {
        connection.execute_batch("PRAGMA disable_progress_bar;")?;
        connection.execute_batch(SCHEMA)?;
        tracing::debug!(path = ?db_path, "kv store ready");
        Ok(Self {
            pool: ConnectionPool {
                db_path,
                root: Mutex::new(connection),
                idle: Mutex::new(Vec::new()),
                max_idle: max_idle.max(1),
            },
        })
    }

    /// Path of the backing file, `None` for in-memory stores.
    pub fn db_path(&self) -> Option<&Path> {
        self.pool.db_path.as_deref()
    }
}

impl KvStore for DuckDbStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let connection = self.pool.acquire()?;
        let mut statement = connection.prepare("SELECT value FROM kv_entries WHERE key = ?")?;
        let mut rows = statement.query(params![key])?;
        let value = match rows.next()? {
            Some(row) => Some(row.get::<_, String>(0)?),
            None => None,
        };
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let connection = self.pool.acquire()?;
        connection.execute(
            "INSERT OR REPLACE INTO kv_entries (key, value, updated_at) VALUES (?, ?, ?)",
            params![key, value, unix_seconds()],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StoreError> {
        let connection = self.pool.acquire()?;
        let removed = connection.execute("DELETE FROM kv_entries WHERE key = ?", params![key])?;
        Ok(removed > 0)
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let connection = self.pool.acquire()?;
        let mut statement = connection
            .prepare("SELECT key FROM kv_entries WHERE starts_with(key, ?) ORDER BY key")?;
        let keys = statement
            .query_map(params![prefix], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }
}

/// Connections cloned from one root database handle.
///
/// Cloning keeps every connection on the same database instance, so writes
/// through one are visible to the others without reopening the file.
struct ConnectionPool {
    db_path: Option<PathBuf>,
    root: Mutex<Connection>,
    idle: Mutex<Vec<Connection>>,
    max_idle: usize,
}

impl ConnectionPool {
    fn acquire(&self) -> Result<PooledConnection<'_>, StoreError> {
        let reused = self
            .idle
            .lock()
            .map_err(|_| StoreError::Poisoned("duckdb idle pool"))?
            .pop();

        let connection = match reused {
            Some(connection) => connection,
            None => self
                .root
                .lock()
                .map_err(|_| StoreError::Poisoned("duckdb root connection"))?
                .try_clone()?,
        };

        Ok(PooledConnection {
            pool: self,
            connection: Some(connection),
        })
    }

    fn release(&self, connection: Connection) {
        if let Ok(mut idle) = self.idle.lock() {
            if idle.len() < self.max_idle {
                idle.push(connection);
            }
        }
    }
}

/// A borrowed connection that returns to the pool when dropped.
struct PooledConnection<'a> {
    pool: &'a ConnectionPool,
    connection: Option<Connection>,
}

impl Deref for PooledConnection<'_> {
    type Target = Connection;

    fn deref(&self) -> &Self::Target {
        match &self.connection {
            Some(connection) => connection,
            // Only `drop` takes the connection out.
            None => unreachable!("pooled connection used after release"),
        }
    }
}

impl Drop for PooledConnection<'_> {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            self.pool.release(connection);
        }
    }
}

fn unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or_default()
}
