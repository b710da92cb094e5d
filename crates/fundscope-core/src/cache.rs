//! Persistent TTL cache for normalized endpoint payloads.
//!
//! Entries live in a [`KvStore`] under `av_<SYMBOL>_<endpoint>` as
//! `{"data": <payload>, "timestamp": <unix millis>}`. Only normalized payloads
//! are written, never raw provider bodies, and empty payloads are skipped so a
//! failed or partial fetch is never replayed from cache.
//!
//! Storage problems (corrupt JSON, write failures) are logged and treated as a
//! miss or a best-effort write. They never reach callers.

use std::sync::Arc;
use std::time::Duration;

use fundscope_store::KvStore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clock::Clock;
use crate::data_source::Endpoint;
use crate::Symbol;

/// Key prefix owned by this cache; nothing else in the store uses it.
pub const CACHE_NAMESPACE: &str = "av";

/// Default validity window.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

const MILLIS_PER_HOUR: i64 = 60 * 60 * 1_000;

/// Payloads that know whether they are worth caching.
pub trait Cacheable {
    /// `false` for empty series and absent profiles.
    fn is_cacheable(&self) -> bool;
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry<T> {
    data: T,
    timestamp: i64,
}

/// Diagnostic view of one cached entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheEntryInfo {
    pub key: String,
    /// Whole hours since the entry was written.
    pub age_hours: i64,
    /// Whole hours of validity left, by the same bucketing.
    pub expires_in_hours: i64,
}

/// TTL cache over a namespaced key-value store.
#[derive(Clone)]
pub struct ResponseCache {
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(store: Arc<dyn KvStore>, clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(store, clock, DEFAULT_TTL)
    }

    pub fn with_ttl(store: Arc<dyn KvStore>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self { store, clock, ttl }
    }

    pub fn key(symbol: &Symbol, endpoint: Endpoint) -> String {
        format!("{CACHE_NAMESPACE}_{symbol}_{}", endpoint.cache_name())
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached payload unless it is missing, unreadable or older
    /// than the TTL. Expired and unreadable entries are deleted.
    pub fn get<T: DeserializeOwned>(&self, symbol: &Symbol, endpoint: Endpoint) -> Option<T> {
        let key = Self::key(symbol, endpoint);
        let raw = match self.store.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(error) => {
                tracing::warn!(%key, %error, "cache read failed");
                return None;
            }
        };

        let entry = match serde_json::from_str::<StoredEntry<T>>(&raw) {
            Ok(entry) => entry,
            Err(error) => {
                tracing::warn!(%key, %error, "discarding unreadable cache entry");
                self.evict(&key);
                return None;
            }
        };

        if self.age_millis(entry.timestamp) >= self.ttl_millis() {
            tracing::debug!(%key, "cache entry expired");
            self.evict(&key);
            return None;
        }

        tracing::debug!(%key, "using cached data");
        Some(entry.data)
    }

    /// Store `payload`, replacing any previous entry. Empty payloads are
    /// skipped. Returns whether the entry was written.
    pub fn put<T: Serialize + Cacheable>(
        &self,
        symbol: &Symbol,
        endpoint: Endpoint,
        payload: &T,
    ) -> bool {
        if !payload.is_cacheable() {
            tracing::debug!(%symbol, endpoint = endpoint.cache_name(), "skipping cache write for empty payload");
            return false;
        }

        let key = Self::key(symbol, endpoint);
        let entry = StoredEntry {
            data: payload,
            timestamp: self.clock.now_millis(),
        };
        let written = serde_json::to_string(&entry)
            .map_err(|error| error.to_string())
            .and_then(|raw| self.store.set(&key, &raw).map_err(|error| error.to_string()));

        match written {
            Ok(()) => {
                tracing::info!(%key, "cached data");
                true
            }
            Err(error) => {
                tracing::warn!(%key, %error, "cache write failed");
                false
            }
        }
    }

    /// Delete every entry in this cache's namespace. Returns how many were
    /// removed.
    pub fn clear(&self) -> usize {
        let keys = match self.namespaced_keys() {
            Some(keys) => keys,
            None => return 0,
        };

        let removed = keys
            .iter()
            .filter(|key| match self.store.remove(key) {
                Ok(existed) => existed,
                Err(error) => {
                    tracing::warn!(%key, %error, "failed to remove cache entry");
                    false
                }
            })
            .count();
        tracing::info!(removed, "cache cleared");
        removed
    }

    /// Age and remaining lifetime of every namespaced entry.
    pub fn inspect(&self) -> Vec<CacheEntryInfo> {
        let ttl_hours = self.ttl_millis() / MILLIS_PER_HOUR;
        self.namespaced_keys()
            .unwrap_or_default()
            .into_iter()
            .filter_map(|key| {
                let raw = self.store.get(&key).ok().flatten()?;
                let entry = serde_json::from_str::<StoredEntry<Value>>(&raw).ok()?;
                let age_hours = self.age_millis(entry.timestamp) / MILLIS_PER_HOUR;
                Some(CacheEntryInfo {
                    key,
                    age_hours,
                    expires_in_hours: ttl_hours - age_hours,
                })
            })
            .collect()
    }

    fn namespaced_keys(&self) -> Option<Vec<String>> {
        let prefix = format!("{CACHE_NAMESPACE}_");
        match self.store.keys_with_prefix(&prefix) {
            Ok(keys) => Some(keys),
            Err(error) => {
                tracing::warn!(%error, "failed to list cache entries");
                None
            }
        }
    }

    fn evict(&self, key: &str) {
        if let Err(error) = self.store.remove(key) {
            tracing::warn!(%key, %error, "failed to evict cache entry");
        }
    }

    fn age_millis(&self, written_at: i64) -> i64 {
        self.clock.now_millis().saturating_sub(written_at)
    }

    fn ttl_millis(&self) -> i64 {
        i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use fundscope_store::MemoryStore;
    use time::macros::datetime;

    fn cache_with_clock() -> (ResponseCache, Arc<MemoryStore>, Arc<ManualClock>) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(datetime!(2024-06-01 09:00 UTC)));
        let cache = ResponseCache::new(store.clone(), clock.clone());
        (cache, store, clock)
    }

    impl Cacheable for Vec<u32> {
        fn is_cacheable(&self) -> bool {
            !self.is_empty()
        }
    }

    #[test]
    fn keys_follow_namespace_symbol_endpoint() {
        let symbol = Symbol::parse("ibm").expect("valid");
        assert_eq!(
            ResponseCache::key(&symbol, Endpoint::HistoricalPrices),
            "av_IBM_daily"
        );
        assert_eq!(
            ResponseCache::key(&symbol, Endpoint::Profile),
            "av_IBM_overview"
        );
    }

    #[test]
    fn corrupt_entry_is_a_miss_and_is_removed() {
        let (cache, store, _) = cache_with_clock();
        store.set("av_IBM_income", "{not json").expect("seed");

        let symbol = Symbol::parse("IBM").expect("valid");
        assert!(cache.get::<Vec<u32>>(&symbol, Endpoint::IncomeStatement).is_none());
        assert!(store.get("av_IBM_income").expect("get").is_none());
    }

    #[test]
    fn inspect_reports_hour_buckets() {
        let (cache, _, clock) = cache_with_clock();
        let symbol = Symbol::parse("IBM").expect("valid");
        assert!(cache.put(&symbol, Endpoint::Earnings, &vec![1_u32]));

        clock.advance(time::Duration::minutes(150));
        let info = cache.inspect();
        assert_eq!(
            info,
            vec![CacheEntryInfo {
                key: String::from("av_IBM_earnings"),
                age_hours: 2,
                expires_in_hours: 22,
            }]
        );
    }

    #[test]
    fn entry_is_valid_just_before_the_ttl() {
        let (cache, _, clock) = cache_with_clock();
        let symbol = Symbol::parse("IBM").expect("valid");
        cache.put(&symbol, Endpoint::Dividends, &vec![7_u32]);

        clock.advance(time::Duration::hours(24) - time::Duration::seconds(1));
        assert_eq!(
            cache.get::<Vec<u32>>(&symbol, Endpoint::Dividends),
            Some(vec![7])
        );

        clock.advance(time::Duration::seconds(1));
        assert_eq!(cache.get::<Vec<u32>>(&symbol, Endpoint::Dividends), None);
    }
}
