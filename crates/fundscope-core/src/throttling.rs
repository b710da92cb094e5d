use std::num::NonZeroU32;
use std::sync::Arc;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Client-side request pacing.
///
/// Spreads calls evenly over a minute. It only delays; provider-side
/// throttling is still reported by the rate-limit detector.
#[derive(Clone)]
pub struct RequestPacer {
    limiter: Arc<DirectRateLimiter>,
    per_minute: NonZeroU32,
}

impl RequestPacer {
    pub fn per_minute(per_minute: NonZeroU32) -> Self {
        Self {
            limiter: Arc::new(RateLimiter::direct(Quota::per_minute(per_minute))),
            per_minute,
        }
    }

    pub const fn requests_per_minute(&self) -> NonZeroU32 {
        self.per_minute
    }

    /// Wait until a request may be sent.
    pub async fn ready(&self) {
        if self.try_acquire() {
            return;
        }
        tracing::debug!(per_minute = self.per_minute.get(), "request budget spent, waiting");
        self.limiter.until_ready().await;
    }

    /// Take a slot without waiting. Returns `false` when the budget is spent.
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl std::fmt::Debug for RequestPacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestPacer")
            .field("per_minute", &self.per_minute)
            .finish()
    }
}
