// src/rate_limit.rs
// Per-client fixed-window rate limiting over a bounded LRU of keys

use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use crate::config::VibeConfig;
use crate::error::{Result, VibeError};

/// Request count for one client key inside its current window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    pub count: u32,
    pub window_start: Instant,
}

impl RateLimitEntry {
    fn new(now: Instant) -> Self {
        Self {
            count: 0,
            window_start: now,
        }
    }

    fn is_expired(&self, now: Instant, window: Duration) -> bool {
        now.saturating_duration_since(self.window_start) >= window
    }
}

/// Bounded, shared request counter keyed by client.
///
/// Entries live for one window measured from their first request; an expired
/// entry starts over at zero. When `capacity` distinct keys are tracked, the
/// least recently used key is evicted regardless of its window.
pub struct RateLimiter {
    entries: Mutex<LruCache<String, RateLimitEntry>>,
    window: Duration,
}

impl RateLimiter {
    pub fn new(capacity: usize, window: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            window,
        }
    }

    pub fn from_config(config: &VibeConfig) -> Self {
        Self::new(config.rate_capacity, config.rate_window())
    }

    /// Count one request for `key`; fails once more than `limit` requests
    /// landed in the current window. The failing request still counts.
    pub fn check(&self, limit: u32, key: &str) -> Result<()> {
        self.check_at(limit, key, Instant::now())
    }

    /// Same as [`check`](Self::check) with an explicit clock reading
    pub fn check_at(&self, limit: u32, key: &str, now: Instant) -> Result<()> {
        // The whole read-modify-write happens under one lock
        let mut entries = self.entries.lock();

        let mut entry = entries
            .get(key)
            .copied()
            .filter(|e| !e.is_expired(now, self.window))
            .unwrap_or_else(|| RateLimitEntry::new(now));
        entry.count = entry.count.saturating_add(1);
        entries.put(key.to_owned(), entry);

        if entry.count > limit {
            let elapsed = now.saturating_duration_since(entry.window_start);
            return Err(VibeError::RateLimited {
                retry_after: self.window.saturating_sub(elapsed),
            });
        }
        Ok(())
    }

    /// Current count for `key` without touching its recency
    pub fn count(&self, key: &str) -> Option<u32> {
        self.entries.lock().peek(key).map(|e| e.count)
    }

    /// Number of keys being tracked
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
