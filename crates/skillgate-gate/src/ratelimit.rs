//! Fixed-window request quota, keyed by client identifier.
//!
//! Each identifier gets a window of `window` length starting at its first
//! request; at most `max_requests` are allowed inside it. Windows do not
//! slide, so a client can fit up to `2 * max_requests - 1` requests around a
//! window boundary.
//!
//! Windows live in a `DashMap`. Each check goes through `entry()`, which holds
//! the identifier's shard lock across the read and the update, so concurrent
//! requests for one client never overshoot the limit.

use crate::error::{GateError, Result};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Source of the current time
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    /// Start at the current instant
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Window end used when `now + window` is not representable
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Per-identifier window state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WindowRecord {
    count: u32,
    reset_at: Instant,
}

/// Fixed-window rate limiter shared by all request handlers
pub struct RateLimiter {
    records: DashMap<String, WindowRecord>,
    window: Duration,
    max_requests: u32,
    sweep_threshold: usize,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Create a limiter on the system clock
    #[must_use]
    pub fn new(window: Duration, max_requests: u32, sweep_threshold: usize) -> Self {
        Self::with_clock(window, max_requests, sweep_threshold, Arc::new(SystemClock))
    }

    /// Create a limiter reading time from `clock`
    #[must_use]
    pub fn with_clock(
        window: Duration,
        max_requests: u32,
        sweep_threshold: usize,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            records: DashMap::new(),
            window,
            max_requests,
            sweep_threshold,
            clock,
        }
    }

    /// Count one request for `identifier`.
    ///
    /// Returns the request's position in the current window on success.
    pub fn check(&self, identifier: &str) -> Result<u32> {
        let now = self.clock.now();

        if self.records.len() > self.sweep_threshold {
            let before = self.records.len();
            self.records.retain(|_, record| now <= record.reset_at);
            debug!(
                "Swept {} expired rate-limit windows ({} remain)",
                before.saturating_sub(self.records.len()),
                self.records.len()
            );
        }

        let reset_at = match self.records.entry(identifier.to_string()) {
            Entry::Occupied(mut occupied) if now <= occupied.get().reset_at => {
                let record = occupied.get_mut();
                if record.count < self.max_requests {
                    record.count += 1;
                    return Ok(record.count);
                }
                record.reset_at
            }
            entry => {
                entry.insert(WindowRecord {
                    count: 1,
                    reset_at: self.window_end(now),
                });
                return Ok(1);
            }
        };

        let retry_after_secs = retry_after(reset_at.saturating_duration_since(now));
        warn!(retry_after_secs, "Rate limit exceeded");
        Err(GateError::RateLimitExceeded {
            reason: "Rate limit exceeded. Please try again later.".to_string(),
            retry_after_secs,
        })
    }

    fn window_end(&self, now: Instant) -> Instant {
        now.checked_add(self.window)
            .or_else(|| now.checked_add(FAR_FUTURE))
            .unwrap_or(now)
    }

    /// Requests counted so far in `identifier`'s window, if it has one
    pub fn count_for(&self, identifier: &str) -> Option<u32> {
        self.records.get(identifier).map(|r| r.count)
    }

    /// Number of identifiers currently tracked
    pub fn tracked(&self) -> usize {
        self.records.len()
    }
}

fn retry_after(remaining: Duration) -> u64 {
    let secs = remaining.as_secs();
    if remaining.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs.max(1)
    }
}
