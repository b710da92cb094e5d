//! Client configuration and API key handling.
//!
//! The API key is an explicit value threaded into the adapter at construction
//! time. Callers that let users change the key rebuild the client.

use std::env;
use std::fmt::{Debug, Display, Formatter};
use std::num::NonZeroU32;
use std::time::Duration;

use fundscope_store::{KvStore, StoreError};
use thiserror::Error;

use crate::cache::DEFAULT_TTL;
use crate::{FetchError, Symbol};

pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Store key under which a user-provided API key is persisted.
pub const API_KEY_STORE_KEY: &str = "alpha_vantage_api_key";

const ENV_API_KEY: &str = "FUNDSCOPE_ALPHAVANTAGE_API_KEY";
const ENV_API_KEY_FALLBACK: &str = "ALPHAVANTAGE_API_KEY";
const ENV_BASE_URL: &str = "FUNDSCOPE_BASE_URL";
const ENV_TIMEOUT_MS: &str = "FUNDSCOPE_TIMEOUT_MS";
const ENV_REQUESTS_PER_MINUTE: &str = "FUNDSCOPE_REQUESTS_PER_MINUTE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("API key cannot be empty")]
    EmptyApiKey,

    #[error("invalid value for {name}: '{value}' ({reason})")]
    InvalidEnv {
        name: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("failed to access persisted configuration: {0}")]
    Store(#[from] StoreError),
}

/// Provider API key.
///
/// `Debug` and `Display` print a masked form; use [`ApiKey::expose`] to get
/// the secret for a request.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub const DEMO: &'static str = "demo";

    pub fn new(value: impl Into<String>) -> Result<Self, ConfigError> {
        let value = value.into().trim().to_owned();
        if value.is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }
        Ok(Self(value))
    }

    pub fn demo() -> Self {
        Self(String::from(Self::DEMO))
    }

    pub fn is_demo(&self) -> bool {
        self.0 == Self::DEMO
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// The demo key only serves [`Symbol::DEMO`].
    pub fn authorize(&self, symbol: &Symbol) -> Result<(), FetchError> {
        if self.is_demo() && !symbol.is_demo() {
            return Err(FetchError::ApiKeyRequired {
                symbol: symbol.to_string(),
            });
        }
        Ok(())
    }

    pub fn masked(&self) -> String {
        if self.is_demo() {
            return self.0.clone();
        }
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 4 {
            return String::from("****");
        }
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("****{tail}")
    }
}

impl Default for ApiKey {
    fn default() -> Self {
        Self::demo()
    }
}

impl Debug for ApiKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ApiKey").field(&self.masked()).finish()
    }
}

impl Display for ApiKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.masked())
    }
}

/// Where the active API key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeySource {
    Flag,
    Environment,
    Store,
    Demo,
}

impl ApiKeySource {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Flag => "flag",
            Self::Environment => "environment",
            Self::Store => "store",
            Self::Demo => "demo",
        }
    }
}

/// Settings for the provider client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: ApiKey,
    pub base_url: String,
    pub timeout_ms: u64,
    pub cache_ttl: Duration,
    /// Client-side pacing; `None` sends requests as fast as they are issued.
    pub requests_per_minute: Option<NonZeroU32>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: ApiKey::demo(),
            base_url: String::from(DEFAULT_BASE_URL),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            cache_ttl: DEFAULT_TTL,
            requests_per_minute: None,
        }
    }
}

impl ClientConfig {
    pub fn with_api_key(mut self, api_key: ApiKey) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_cache_ttl(mut self, cache_ttl: Duration) -> Self {
        self.cache_ttl = cache_ttl;
        self
    }

    pub fn with_requests_per_minute(mut self, requests_per_minute: Option<NonZeroU32>) -> Self {
        self.requests_per_minute = requests_per_minute;
        self
    }

    /// Apply `FUNDSCOPE_BASE_URL`, `FUNDSCOPE_TIMEOUT_MS` and
    /// `FUNDSCOPE_REQUESTS_PER_MINUTE` on top of the defaults. The API key is
    /// resolved separately by [`resolve_api_key`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(base_url) = lookup(ENV_BASE_URL).filter(|value| !value.trim().is_empty()) {
            config.base_url = base_url.trim().to_owned();
        }

        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            config.timeout_ms = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|timeout| *timeout > 0)
                .ok_or(ConfigError::InvalidEnv {
                    name: ENV_TIMEOUT_MS,
                    value: raw.clone(),
                    reason: "expected a positive number of milliseconds",
                })?;
        }

        if let Some(raw) = lookup(ENV_REQUESTS_PER_MINUTE) {
            let rpm = raw
                .trim()
                .parse::<u32>()
                .ok()
                .and_then(NonZeroU32::new)
                .ok_or(ConfigError::InvalidEnv {
                    name: ENV_REQUESTS_PER_MINUTE,
                    value: raw.clone(),
                    reason: "expected a positive integer",
                })?;
            config.requests_per_minute = Some(rpm);
        }

        Ok(config)
    }
}

/// Resolve the active key: explicit flag, then environment, then the
/// persisted key, then `demo`.
pub fn resolve_api_key(
    flag: Option<&str>,
    store: &dyn KvStore,
) -> Result<(ApiKey, ApiKeySource), ConfigError> {
    resolve_api_key_with(flag, store, |name| env::var(name).ok())
}

fn resolve_api_key_with(
    flag: Option<&str>,
    store: &dyn KvStore,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(ApiKey, ApiKeySource), ConfigError> {
    if let Some(key) = flag.and_then(|value| ApiKey::new(value).ok()) {
        return Ok((key, ApiKeySource::Flag));
    }

    let from_env = [ENV_API_KEY, ENV_API_KEY_FALLBACK]
        .into_iter()
        .filter_map(&lookup)
        .find_map(|value| ApiKey::new(value).ok());
    if let Some(key) = from_env {
        return Ok((key, ApiKeySource::Environment));
    }

    if let Some(key) = load_api_key(store)? {
        return Ok((key, ApiKeySource::Store));
    }

    Ok((ApiKey::demo(), ApiKeySource::Demo))
}

/// The persisted key, if one was saved and is non-blank.
pub fn load_api_key(store: &dyn KvStore) -> Result<Option<ApiKey>, ConfigError> {
    Ok(store
        .get(API_KEY_STORE_KEY)?
        .and_then(|raw| ApiKey::new(raw).ok()))
}

pub fn save_api_key(store: &dyn KvStore, key: &ApiKey) -> Result<(), ConfigError> {
    store.set(API_KEY_STORE_KEY, key.expose())?;
    tracing::info!(key = %key, "saved API key");
    Ok(())
}

/// Forget the persisted key. Returns whether one was stored.
pub fn reset_api_key(store: &dyn KvStore) -> Result<bool, ConfigError> {
    Ok(store.remove(API_KEY_STORE_KEY)?)
}
