//! Behavior-driven tests for the response cache
//!
//! These tests verify HOW cached payloads are stored, expired and cleared,
//! against both the in-memory and the on-disk store.

use std::sync::Arc;

use fundscope_core::{
    AlphaVantageClient, ApiKey, CacheEntryInfo, ClientConfig, Endpoint, FinancialDataSource,
    IncomeRecord, ManualClock, Period, ResponseCache, ScriptedHttpClient, Symbol,
    TimeSeriesBundle,
};
use fundscope_store::{DuckDbStore, KvStore, MemoryStore, StoreConfig, StoreError};
use serde_json::json;
use time::macros::{date, datetime};
use time::Duration;

fn ibm() -> Symbol {
    Symbol::parse("IBM").expect("valid")
}

fn income_bundle() -> TimeSeriesBundle<IncomeRecord> {
    TimeSeriesBundle {
        annual: vec![IncomeRecord {
            date: date!(2023 - 12 - 31),
            period: Period::Annual,
            revenue: 61_860_000_000,
            ebitda: 14_000_000_000,
            net_income: 7_502_000_000,
            eps: 8.14,
            operating_expenses: 31_000_000_000,
        }],
        quarterly: Vec::new(),
    }
}

fn memory_cache() -> (ResponseCache, Arc<MemoryStore>, Arc<ManualClock>) {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(datetime!(2024-06-01 08:00 UTC)));
    let cache = ResponseCache::new(store.clone(), clock.clone());
    (cache, store, clock)
}

/// Store whose every operation fails, as a full disk or lost database would.
struct UnavailableStore;

impl KvStore for UnavailableStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Poisoned("kv read"))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Io(std::io::Error::other("quota exceeded")))
    }

    fn remove(&self, _key: &str) -> Result<bool, StoreError> {
        Err(StoreError::Poisoned("kv remove"))
    }

    fn keys_with_prefix(&self, _prefix: &str) -> Result<Vec<String>, StoreError> {
        Err(StoreError::Poisoned("kv list"))
    }
}

// =============================================================================
// Cache: Round Trip and Expiry
// =============================================================================

#[test]
fn when_payload_is_put_then_get_returns_an_equal_value() {
    // Given: An empty cache
    let (cache, _, _) = memory_cache();
    let payload = income_bundle();

    // When: The payload is written and read back
    assert!(cache.put(&ibm(), Endpoint::IncomeStatement, &payload));
    let cached = cache.get::<TimeSeriesBundle<IncomeRecord>>(&ibm(), Endpoint::IncomeStatement);

    // Then: The value is deep-equal
    assert_eq!(cached, Some(payload));
}

#[test]
fn when_clock_passes_24_hours_entry_is_absent_and_deleted() {
    // Given: A cached payload
    let (cache, store, clock) = memory_cache();
    cache.put(&ibm(), Endpoint::IncomeStatement, &income_bundle());

    // When: The clock moves past the TTL
    clock.advance(Duration::hours(24) + Duration::minutes(1));

    // Then: The entry reads as absent and is removed from storage
    assert!(cache
        .get::<TimeSeriesBundle<IncomeRecord>>(&ibm(), Endpoint::IncomeStatement)
        .is_none());
    assert!(store.get("av_IBM_income").expect("read").is_none());
}

#[test]
fn when_payload_is_empty_nothing_is_stored() {
    // Given: An empty bundle, an empty price series and no profile
    let (cache, store, _) = memory_cache();

    // When: They are written
    let bundle_written = cache.put(
        &ibm(),
        Endpoint::IncomeStatement,
        &TimeSeriesBundle::<IncomeRecord>::empty(),
    );
    let prices_written = cache.put(
        &ibm(),
        Endpoint::HistoricalPrices,
        &Vec::<fundscope_core::PricePoint>::new(),
    );
    let profile_written = cache.put(
        &ibm(),
        Endpoint::Profile,
        &None::<fundscope_core::CompanyProfile>,
    );

    // Then: Nothing was persisted
    assert!(!bundle_written && !prices_written && !profile_written);
    assert!(store.is_empty());
    assert!(cache
        .get::<TimeSeriesBundle<IncomeRecord>>(&ibm(), Endpoint::IncomeStatement)
        .is_none());
}

// =============================================================================
// Cache: Clear and Inspect
// =============================================================================

#[test]
fn when_cache_is_cleared_unrelated_keys_survive() {
    // Given: Cached entries next to a persisted API key
    let (cache, store, _) = memory_cache();
    store
        .set("alpha_vantage_api_key", "MYKEY")
        .expect("seed key");
    cache.put(&ibm(), Endpoint::IncomeStatement, &income_bundle());
    cache.put(
        &Symbol::parse("MSFT").expect("valid"),
        Endpoint::IncomeStatement,
        &income_bundle(),
    );

    // When: The cache is cleared
    let removed = cache.clear();

    // Then: Only namespaced entries are gone
    assert_eq!(removed, 2);
    assert_eq!(
        store.get("alpha_vantage_api_key").expect("read").as_deref(),
        Some("MYKEY")
    );
    assert!(cache.inspect().is_empty());
}

#[test]
fn when_entries_are_inspected_age_and_remaining_life_are_reported() {
    // Given: Two entries written five hours apart
    let (cache, _, clock) = memory_cache();
    cache.put(&ibm(), Endpoint::IncomeStatement, &income_bundle());
    clock.advance(Duration::hours(5));
    cache.put(&ibm(), Endpoint::CashFlow, &income_bundle());

    // When: The cache is inspected
    let info = cache.inspect();

    // Then: Each entry reports whole hours
    assert_eq!(
        info,
        vec![
            CacheEntryInfo {
                key: String::from("av_IBM_cashflow"),
                age_hours: 0,
                expires_in_hours: 24,
            },
            CacheEntryInfo {
                key: String::from("av_IBM_income"),
                age_hours: 5,
                expires_in_hours: 19,
            },
        ]
    );
}

// =============================================================================
// Cache: Persistence and Fetch Integration
// =============================================================================

#[test]
fn when_store_is_reopened_cached_entries_are_still_there() {
    // Given: A DuckDB-backed cache in a temporary home
    let temp = tempfile::tempdir().expect("tempdir");
    let config = StoreConfig::in_home(temp.path());
    let clock = Arc::new(ManualClock::new(datetime!(2024-06-01 08:00 UTC)));

    {
        let store = Arc::new(DuckDbStore::open(&config).expect("open store"));
        let cache = ResponseCache::new(store, clock.clone());
        assert!(cache.put(&ibm(), Endpoint::IncomeStatement, &income_bundle()));
    }

    // When: The store is opened again
    let store = Arc::new(DuckDbStore::open(&config).expect("reopen store"));
    let cache = ResponseCache::new(store, clock);

    // Then: The payload is served from disk
    assert_eq!(
        cache.get::<TimeSeriesBundle<IncomeRecord>>(&ibm(), Endpoint::IncomeStatement),
        Some(income_bundle())
    );
}

#[tokio::test]
async fn when_endpoint_is_fetched_twice_second_call_hits_the_cache() {
    // Given: A client with a scripted income statement
    let http = Arc::new(ScriptedHttpClient::new().respond_json(
        "INCOME_STATEMENT",
        &json!({
            "symbol": "IBM",
            "annualReports": [{"fiscalDateEnding": "2023-12-31", "totalRevenue": "61860000000"}],
            "quarterlyReports": []
        }),
    ));
    let client = AlphaVantageClient::with_parts(
        ClientConfig::default().with_api_key(ApiKey::demo()),
        http.clone(),
        Arc::new(MemoryStore::new()),
        Arc::new(ManualClock::new(datetime!(2024-06-01 08:00 UTC))),
    );

    // When: The same endpoint is requested twice
    let first = client.income_statement(&ibm()).await.expect("first fetch");
    let second = client.income_statement(&ibm()).await.expect("second fetch");

    // Then: Only one request reached the provider
    assert_eq!(first, second);
    assert_eq!(http.calls("INCOME_STATEMENT"), 1);
}

#[tokio::test]
async fn when_provider_is_throttled_nothing_is_cached() {
    // Given: A throttled earnings endpoint
    let http = Arc::new(ScriptedHttpClient::new().respond_json(
        "EARNINGS",
        &json!({"Information": "Our standard API rate limit is 25 requests per day."}),
    ));
    let store = Arc::new(MemoryStore::new());
    let client = AlphaVantageClient::with_parts(
        ClientConfig::default(),
        http.clone(),
        store.clone(),
        Arc::new(ManualClock::new(datetime!(2024-06-01 08:00 UTC))),
    );

    // When: Earnings are requested twice
    assert!(client.earnings(&ibm()).await.is_err());
    assert!(client.earnings(&ibm()).await.is_err());

    // Then: Both calls went to the provider and the store is untouched
    assert_eq!(http.calls("EARNINGS"), 2);
    assert!(store.is_empty());
}

// =============================================================================
// Cache: Store Failures
// =============================================================================

#[test]
fn when_store_fails_reads_are_misses_and_writes_are_skipped() {
    // Given: A cache over a store that rejects every operation
    let cache = ResponseCache::new(
        Arc::new(UnavailableStore),
        Arc::new(ManualClock::new(datetime!(2024-06-01 08:00 UTC))),
    );

    // When: Every cache operation is attempted
    let written = cache.put(&ibm(), Endpoint::IncomeStatement, &income_bundle());
    let cached = cache.get::<TimeSeriesBundle<IncomeRecord>>(&ibm(), Endpoint::IncomeStatement);

    // Then: Nothing panics or propagates; the cache just looks empty
    assert!(!written);
    assert!(cached.is_none());
    assert_eq!(cache.clear(), 0);
    assert!(cache.inspect().is_empty());
}

#[tokio::test]
async fn when_store_fails_fetches_still_return_normalized_data() {
    // Given: A client whose store cannot be read or written
    let http = Arc::new(ScriptedHttpClient::new().respond_json(
        "INCOME_STATEMENT",
        &json!({
            "annualReports": [{"fiscalDateEnding": "2023-12-31", "totalRevenue": "61860000000"}],
            "quarterlyReports": []
        }),
    ));
    let client = AlphaVantageClient::with_parts(
        ClientConfig::default().with_api_key(ApiKey::demo()),
        http.clone(),
        Arc::new(UnavailableStore),
        Arc::new(ManualClock::new(datetime!(2024-06-01 08:00 UTC))),
    );

    // When: The same endpoint is requested twice
    let first = client.income_statement(&ibm()).await.expect("first fetch");
    let second = client.income_statement(&ibm()).await.expect("second fetch");

    // Then: Both calls succeed from the network
    assert_eq!(first.annual.len(), 1);
    assert_eq!(first.annual[0].revenue, 61_860_000_000);
    assert_eq!(first, second);
    assert_eq!(http.calls("INCOME_STATEMENT"), 2);
}
