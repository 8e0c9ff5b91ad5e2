//! Global request pacing shared by every fetcher of a session.
//!
//! A single ticking gate: each [`RateLimiter::acquire`] consumes one tick, so
//! at most one fetch starts per tick period no matter how many workers are
//! waiting. Throughput is bounded by the period, not the worker count.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use sitewatch_core::throttle::RateLimiter;
//!
//! # async fn run() {
//! let limiter = RateLimiter::new(Duration::from_millis(200));
//! for url in ["https://a.test/1", "https://a.test/2"] {
//!     limiter.acquire().await;
//!     println!("fetching {url}");
//! }
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{Interval, MissedTickBehavior};

/// Shared ticking gate. Clones share the same gate.
#[derive(Clone)]
pub struct RateLimiter {
    period: Duration,
    /// Created on first use so the limiter can be built outside a runtime.
    ticker: Arc<Mutex<Option<Interval>>>,
}

impl RateLimiter {
    /// Create a gate releasing one caller per `period`.
    ///
    /// A zero period is raised to one millisecond.
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            ticker: Arc::new(Mutex::new(None)),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Wait for the next tick. The first call returns immediately.
    pub async fn acquire(&self) {
        let mut guard = self.ticker.lock().await;
        let ticker = guard.get_or_insert_with(|| {
            let mut ticker = tokio::time::interval(self.period);
            // Missed ticks are never replayed as a burst.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });
        ticker.tick().await;
    }
}
