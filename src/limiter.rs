//! Per-client request gate.
//!
//! Every client key remembers the instant of its most recent request. A
//! request arriving less than `window` after the previous one is refused, and
//! the stored instant is replaced on every call, refused or not, so a client
//! that keeps retrying keeps pushing its own window forward.

use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitResult {
    Allowed,
    Limited {
        /// How long the client has to stay quiet before the next attempt
        retry_after: Duration,
    },
}

pub struct RateLimiter {
    window: Duration,
    ttl: Duration,
    last_seen: Mutex<HashMap<String, Instant>>,
}

impl RateLimiter {
    pub fn new(window: Duration, ttl: Duration) -> Self {
        Self {
            window,
            ttl,
            last_seen: Mutex::new(HashMap::new()),
        }
    }

    /// Record a request from `key` and decide whether it may proceed.
    pub async fn check(&self, key: &str) -> RateLimitResult {
        let now = Instant::now();
        // Held across compare and store so two concurrent requests of one key
        // cannot both pass.
        let mut last_seen = self.last_seen.lock().await;

        let Some(previous) = last_seen.insert(key.to_owned(), now) else {
            debug!(key, "First request from client");
            return RateLimitResult::Allowed;
        };

        let elapsed = now.duration_since(previous);
        if elapsed < self.window {
            debug!(key, ?elapsed, "Client is inside the rate limit window");
            RateLimitResult::Limited {
                retry_after: self.window,
            }
        } else {
            RateLimitResult::Allowed
        }
    }

    /// Forget clients that have been idle for longer than the TTL.
    pub async fn cleanup(&self) {
        let now = Instant::now();
        let mut last_seen = self.last_seen.lock().await;
        let before = last_seen.len();

        last_seen.retain(|_, seen| now.duration_since(*seen) < self.ttl);

        let removed = before - last_seen.len();
        if removed > 0 {
            debug!(removed, remaining = last_seen.len(), "Expired rate limit entries");
        }
    }

    #[cfg(test)]
    async fn tracked_clients(&self) -> usize {
        self.last_seen.lock().await.len()
    }
}
