use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::Quota;
use tracing::trace;

type KeyedLimiter = governor::RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// Per-key minimum-delay spacing for outbound calls.
///
/// Each key names a logical endpoint (normally the upstream host).
/// The first call under a key proceeds immediately; every later call
/// waits until at least `min_delay` has passed since the previous
/// grant for that key. The grant time is recorded when the waiter is
/// released, so the caller's own request time is not counted against
/// the spacing. Keys are independent and there is no fairness
/// guarantee among concurrent waiters on one key.
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Option<Arc<KeyedLimiter>>,
    min_delay: Duration,
}

impl RateLimiter {
    /// A zero `min_delay` disables pacing entirely.
    pub fn new(min_delay: Duration) -> Self {
        let limiter = Quota::with_period(min_delay).map(|quota| {
            Arc::new(governor::RateLimiter::keyed(
                quota.allow_burst(NonZeroU32::MIN),
            ))
        });
        Self { limiter, min_delay }
    }

    pub const fn min_delay(&self) -> Duration {
        self.min_delay
    }

    /// Block until the key's spacing interval has elapsed, then record
    /// now as the key's last-call time.
    pub async fn wait_if_needed(&self, key: &str) {
        let Some(limiter) = &self.limiter else {
            return;
        };
        limiter.until_key_ready(&key.to_string()).await;
        trace!(key, "rate limit grant");
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("min_delay", &self.min_delay)
            .field("enabled", &self.limiter.is_some())
            .finish()
    }
}

/// Rate-limiter key for a URL: its host.
pub fn endpoint_key(url: &str) -> &str {
    let rest = url.split("://").nth(1).unwrap_or(url);
    rest.split('/').next().unwrap_or(rest)
}
