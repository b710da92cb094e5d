//! Classification of provider throttling signals.
//!
//! Alpha Vantage answers throttled calls with HTTP 200 and a body carrying an
//! `Information` (current) or `Note` (legacy) string instead of data. The
//! detector runs on every body before any normalizer sees it.

use std::fmt::{Display, Formatter};

use serde_json::Value;

const DAILY_QUOTA_MESSAGE: &str = "API rate limit exceeded (25 requests/day limit reached). \
     Please try again tomorrow or upgrade to a premium plan.";
const FREQUENCY_MESSAGE: &str = "API call frequency limit reached. Please try again later.";
const HTTP_429_MESSAGE: &str = "API rate limit exceeded. Please try again tomorrow.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateLimitKind {
    /// The free tier's daily request budget is spent.
    DailyQuota,
    /// Too many calls in a short window; retrying later works.
    Frequency,
    /// Generic throttling without a recognizable budget hint.
    Throttled,
}

/// A detected throttling condition with the message shown to users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimit {
    kind: RateLimitKind,
    message: String,
}

impl RateLimit {
    pub fn new(kind: RateLimitKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> RateLimitKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Inspect a decoded body for an `Information` or `Note` throttling signal.
    pub fn detect(body: &Value) -> Option<Self> {
        if let Some(info) = body.get("Information").and_then(Value::as_str) {
            if info.contains("rate limit") {
                return Some(if info.contains("25 requests per day") {
                    Self::new(RateLimitKind::DailyQuota, DAILY_QUOTA_MESSAGE)
                } else {
                    Self::new(
                        RateLimitKind::Throttled,
                        format!("API rate limit exceeded: {info}"),
                    )
                });
            }
        }

        body.get("Note")
            .and_then(Value::as_str)
            .filter(|note| note.contains("frequency limit"))
            .map(|_| Self::new(RateLimitKind::Frequency, FREQUENCY_MESSAGE))
    }

    /// Transport-level throttling; only HTTP 429 qualifies.
    pub fn from_status(status: u16) -> Option<Self> {
        (status == 429).then(|| Self::new(RateLimitKind::DailyQuota, HTTP_429_MESSAGE))
    }
}

impl Display for RateLimit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}
