// Per-source limiter for /collect: one accepted request per key per window.

use std::time::Duration;

use governor::{DefaultKeyedRateLimiter, Quota};

/// Tracked keys above which stale entries are pruned.
const PRUNE_ABOVE: usize = 10_000;

pub struct RateLimiter {
    inner: DefaultKeyedRateLimiter<String>,
}

impl RateLimiter {
    pub fn new(window: Duration) -> anyhow::Result<Self> {
        let quota = Quota::with_period(window)
            .ok_or_else(|| anyhow::anyhow!("rate limit window must be > 0"))?;
        Ok(Self {
            inner: governor::RateLimiter::keyed(quota),
        })
    }

    /// True when `key` may send now; the accepted request starts a new window.
    pub fn check(&self, key: &str) -> bool {
        if self.inner.len() > PRUNE_ABOVE {
            self.inner.retain_recent();
        }
        self.inner.check_key(&key.to_string()).is_ok()
    }
}
