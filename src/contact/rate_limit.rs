// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Fixed-window rate limiter for contact submissions.
//!
//! Each client key gets `max_requests` submissions per window. Windows are
//! kept in an LRU map so the number of tracked clients stays bounded.

use std::num::NonZeroUsize;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use lru::LruCache;

use crate::config::RateLimitSettings;

/// Per-client window: when it opened and how many requests it has seen.
struct Window {
    started_at: Instant,
    count: u32,
}

/// Result of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed { .. })
    }
}

/// In-process limiter owned by `AppState`.
pub struct RateLimiter {
    windows: Mutex<LruCache<String, Window>>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(settings: RateLimitSettings) -> Self {
        let capacity = NonZeroUsize::new(settings.capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            windows: Mutex::new(LruCache::new(capacity)),
            max_requests: settings.max_requests,
            window: settings.window,
        }
    }

    /// Record a request from `client` and decide whether it may proceed.
    pub fn check(&self, client: &str) -> RateLimitDecision {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: &str, now: Instant) -> RateLimitDecision {
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(entry) = windows.get_mut(client) {
            let elapsed = now.saturating_duration_since(entry.started_at);
            if elapsed < self.window {
                if entry.count >= self.max_requests {
                    return RateLimitDecision::Limited {
                        retry_after: self.window - elapsed,
                    };
                }
                entry.count += 1;
                return RateLimitDecision::Allowed {
                    remaining: self.max_requests - entry.count,
                };
            }
        }

        windows.put(
            client.to_string(),
            Window {
                started_at: now,
                count: 1,
            },
        );
        RateLimitDecision::Allowed {
            remaining: self.max_requests.saturating_sub(1),
        }
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32, window_secs: u64, capacity: usize) -> RateLimiter {
        RateLimiter::new(RateLimitSettings {
            max_requests,
            window: Duration::from_secs(window_secs),
            capacity,
        })
    }

    #[test]
    fn allows_up_to_the_limit_then_blocks() {
        let limiter = limiter(3, 60, 10);
        let now = Instant::now();

        assert_eq!(
            limiter.check_at("1.2.3.4", now),
            RateLimitDecision::Allowed { remaining: 2 }
        );
        assert_eq!(
            limiter.check_at("1.2.3.4", now),
            RateLimitDecision::Allowed { remaining: 1 }
        );
        assert_eq!(
            limiter.check_at("1.2.3.4", now),
            RateLimitDecision::Allowed { remaining: 0 }
        );

        let later = now + Duration::from_secs(20);
        assert_eq!(
            limiter.check_at("1.2.3.4", later),
            RateLimitDecision::Limited {
                retry_after: Duration::from_secs(40)
            }
        );
    }

    #[test]
    fn window_resets_after_expiry() {
        let limiter = limiter(1, 60, 10);
        let now = Instant::now();

        assert!(limiter.check_at("client", now).is_allowed());
        assert!(!limiter.check_at("client", now).is_allowed());
        assert!(limiter
            .check_at("client", now + Duration::from_secs(60))
            .is_allowed());
    }

    #[test]
    fn clients_are_counted_separately() {
        let limiter = limiter(1, 60, 10);
        let now = Instant::now();

        assert!(limiter.check_at("a", now).is_allowed());
        assert!(limiter.check_at("b", now).is_allowed());
        assert!(!limiter.check_at("a", now).is_allowed());
    }

    #[test]
    fn tracked_clients_are_bounded() {
        let limiter = limiter(1, 60, 2);
        let now = Instant::now();

        limiter.check_at("a", now);
        limiter.check_at("b", now);
        limiter.check_at("c", now);
        assert_eq!(limiter.tracked_clients(), 2);

        // "a" was evicted, so it starts a fresh window.
        assert!(limiter.check_at("a", now).is_allowed());
    }
}
