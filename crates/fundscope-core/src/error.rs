use thiserror::Error;

use crate::rate_limit::RateLimit;

/// Validation errors for user-supplied inputs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter: '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("invalid timeframe '{value}', expected one of quarterly, annual")]
    InvalidTimeframe { value: String },
    #[error("date must be formatted YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },
}

/// Coarse classification of a [`FetchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    InvalidSymbol,
    RateLimited,
    MissingData,
    Transport,
    ApiKeyRequired,
    Decode,
    BasicDataUnavailable,
}

/// Failure of one provider call, or of a whole symbol lookup.
///
/// None of these are retried automatically.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FetchError {
    /// The provider reported the symbol as unknown.
    #[error("invalid symbol: {symbol}")]
    InvalidSymbol { symbol: String },

    /// Throttling detected in the body or via HTTP 429.
    #[error("{0}")]
    RateLimited(RateLimit),

    /// The call succeeded but the expected series/object was absent.
    #[error("no {what} found for symbol: {symbol}")]
    MissingData { what: &'static str, symbol: String },

    /// Network, timeout or unexpected HTTP status.
    #[error("transport error: {0}")]
    Transport(String),

    /// The demo key only serves IBM.
    #[error(
        "an Alpha Vantage API key is required to query '{symbol}' (the demo key only serves IBM); \
         set one with `fundscope config set-key`"
    )]
    ApiKeyRequired { symbol: String },

    /// The body was not the JSON document we expected.
    #[error("failed to decode provider response: {0}")]
    Decode(String),

    /// Both the profile and the price history failed.
    #[error("failed to fetch basic data for {symbol}: {}", errors.join(", "))]
    BasicDataUnavailable { symbol: String, errors: Vec<String> },
}

impl FetchError {
    pub fn missing(what: &'static str, symbol: impl Into<String>) -> Self {
        Self::MissingData {
            what,
            symbol: symbol.into(),
        }
    }

    pub const fn kind(&self) -> FetchErrorKind {
        match self {
            Self::InvalidSymbol { .. } => FetchErrorKind::InvalidSymbol,
            Self::RateLimited(_) => FetchErrorKind::RateLimited,
            Self::MissingData { .. } => FetchErrorKind::MissingData,
            Self::Transport(_) => FetchErrorKind::Transport,
            Self::ApiKeyRequired { .. } => FetchErrorKind::ApiKeyRequired,
            Self::Decode(_) => FetchErrorKind::Decode,
            Self::BasicDataUnavailable { .. } => FetchErrorKind::BasicDataUnavailable,
        }
    }

    pub const fn code(&self) -> &'static str {
        match self.kind() {
            FetchErrorKind::InvalidSymbol => "fetch.invalid_symbol",
            FetchErrorKind::RateLimited => "fetch.rate_limited",
            FetchErrorKind::MissingData => "fetch.missing_data",
            FetchErrorKind::Transport => "fetch.transport",
            FetchErrorKind::ApiKeyRequired => "fetch.api_key_required",
            FetchErrorKind::Decode => "fetch.decode",
            FetchErrorKind::BasicDataUnavailable => "fetch.basic_data_unavailable",
        }
    }
}

/// Top-level error type for core operations outside the fetch path.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    #[error(transparent)]
    Store(#[from] fundscope_store::StoreError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
