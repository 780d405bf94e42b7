use std::num::NonZeroU32;
use std::thread;
use std::time::Duration;

use governor::clock::{Clock, DefaultClock};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};

/// Politeness throttle: consecutive grants are at least `min_interval` apart.
///
/// A single not-keyed limiter with a burst of one. A zero interval disables
/// throttling.
pub struct RateGate {
    limiter: Option<DefaultDirectRateLimiter>,
    clock: DefaultClock,
}

impl RateGate {
    pub fn new(min_interval: Duration) -> Self {
        let limiter = Quota::with_period(min_interval)
            .map(|quota| RateLimiter::direct(quota.allow_burst(NonZeroU32::MIN)));
        Self {
            limiter,
            clock: DefaultClock::default(),
        }
    }

    /// Blocks the calling thread until the next request may be sent.
    pub fn acquire(&self) {
        let Some(limiter) = &self.limiter else {
            return;
        };
        while let Err(not_until) = limiter.check() {
            let wait = not_until.wait_time_from(self.clock.now());
            tracing::debug!(wait_ms = wait.as_millis() as u64, "rate gate waiting");
            thread::sleep(wait);
        }
    }
}
