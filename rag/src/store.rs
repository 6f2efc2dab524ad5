//! Session-scoped key-value storage and rate limiting.
//!
//! [`KeyValueStore`] is the seam for anything that needs short-lived shared
//! state: rate-limit windows, session scratch data. [`MemoryStore`] is the
//! in-process implementation; a Redis-backed one plugs in behind the same
//! trait for multi-instance deployments.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::error::RagError;

/// Requests allowed per window when none is configured.
pub const RATE_LIMIT_MAX_REQUESTS: usize = 30;

/// Default sliding-window length.
pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);

/// Minimal async key-value interface with optional expiry.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>);

    async fn remove(&self, key: &str);
}

/// In-process store backed by a mutexed map. Expired entries are dropped
/// lazily on read.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, (String, Option<Instant>)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match entries.get(key) {
            Some((_, Some(deadline))) if *deadline <= Instant::now() => {
                entries.remove(key);
                None
            }
            Some((value, _)) => Some(value.clone()),
            None => None,
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) {
        let deadline = ttl.map(|ttl| Instant::now() + ttl);
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), (value, deadline));
    }

    async fn remove(&self, key: &str) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
    }
}

/// Sliding-window rate limiter keyed by session.
///
/// Timestamps are stored as a JSON array in the underlying store, so the
/// limiter works unchanged over any [`KeyValueStore`] backend.
pub struct RateLimiter {
    store: Arc<dyn KeyValueStore>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_limits(store, RATE_LIMIT_MAX_REQUESTS, RATE_LIMIT_WINDOW)
    }

    pub fn with_limits(
        store: Arc<dyn KeyValueStore>,
        max_requests: usize,
        window: Duration,
    ) -> Self {
        Self {
            store,
            max_requests,
            window,
        }
    }

    /// Record one request for `session_id`, failing if the window is full.
    pub async fn check(&self, session_id: &str) -> Result<(), RagError> {
        let key = format!("ratelimit:{session_id}");
        let now = chrono::Utc::now().timestamp_millis();
        let window_start = now - self.window.as_millis() as i64;

        let mut hits: Vec<i64> = match self.store.get(&key).await {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_default(),
            None => Vec::new(),
        };
        hits.retain(|stamp| *stamp > window_start);

        if hits.len() >= self.max_requests {
            log::warn!(
                "session {session_id} exceeded {} requests per {:?}",
                self.max_requests,
                self.window
            );
            return Err(RagError::RateLimited(session_id.to_string()));
        }

        hits.push(now);
        let serialized = serde_json::to_string(&hits)?;
        self.store.set(&key, serialized, Some(self.window)).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        store.set("k", "v".to_string(), None).await;
        assert_eq!(store.get("k").await.as_deref(), Some("v"));
        store.remove("k").await;
        assert_eq!(store.get("k").await, None);
    }

    #[tokio::test]
    async fn test_memory_store_ttl_expires() {
        let store = MemoryStore::new();
        store
            .set("k", "v".to_string(), Some(Duration::from_millis(20)))
            .await;
        assert!(store.get("k").await.is_some());
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(store.get("k").await, None);
    }

    #[tokio::test]
    async fn test_rate_limiter_allows_up_to_limit() {
        let limiter = RateLimiter::with_limits(
            Arc::new(MemoryStore::new()),
            3,
            Duration::from_secs(60),
        );

        for _ in 0..3 {
            assert!(limiter.check("s1").await.is_ok());
        }
        assert!(matches!(
            limiter.check("s1").await,
            Err(RagError::RateLimited(session)) if session == "s1"
        ));
    }

    #[tokio::test]
    async fn test_rate_limiter_sessions_independent() {
        let limiter = RateLimiter::with_limits(
            Arc::new(MemoryStore::new()),
            1,
            Duration::from_secs(60),
        );

        assert!(limiter.check("a").await.is_ok());
        assert!(limiter.check("b").await.is_ok());
        assert!(limiter.check("a").await.is_err());
    }

    #[tokio::test]
    async fn test_rate_limiter_window_slides() {
        let limiter = RateLimiter::with_limits(
            Arc::new(MemoryStore::new()),
            1,
            Duration::from_millis(30),
        );

        assert!(limiter.check("s").await.is_ok());
        assert!(limiter.check("s").await.is_err());
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(limiter.check("s").await.is_ok());
    }
}
