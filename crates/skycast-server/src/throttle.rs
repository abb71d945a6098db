//! Fixed-window request throttle for anonymous clients.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

struct WindowCounter {
    window_start: Instant,
    count: u32,
}

/// Per-client fixed-window rate limiter.
///
/// Counts requests per key (client IP) within a rolling window; expired
/// windows are dropped on the next check.
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    counters: Mutex<HashMap<String, WindowCounter>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            counters: Mutex::new(HashMap::new()),
        }
    }

    /// Record one request for `key`. Returns false if the key is over its limit.
    pub fn check(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut counters = self.counters.lock();

        counters.retain(|_, c| now.duration_since(c.window_start) < self.window);

        let counter = counters.entry(key.to_string()).or_insert(WindowCounter {
            window_start: now,
            count: 0,
        });

        if counter.count >= self.max_requests {
            return false;
        }
        counter.count += 1;
        true
    }
}
