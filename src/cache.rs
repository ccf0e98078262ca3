//! Route cache
//!
//! Small in-process cache for the accounts-overview route, with explicit
//! invalidation after mutating operations (linking a bank, submitting a
//! transfer) so subsequent reads reflect new state. Entries also expire on
//! a short TTL as a backstop.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct RouteCache {
    ttl: Duration,
    entries: Arc<RwLock<HashMap<String, (Instant, Value)>>>,
}

impl RouteCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Fetch a cached response if it exists and is still fresh.
    pub async fn get(&self, key: &str) -> Option<Value> {
        let entries = self.entries.read().await;
        let (stored_at, value) = entries.get(key)?;
        if stored_at.elapsed() > self.ttl {
            return None;
        }
        Some(value.clone())
    }

    pub async fn insert(&self, key: String, value: Value) {
        self.entries
            .write()
            .await
            .insert(key, (Instant::now(), value));
    }

    /// Drop the cached entry for a key after a mutation touching it.
    pub async fn invalidate(&self, key: &str) {
        self.entries.write().await.remove(key);
    }
}

/// Cache key for a user's accounts overview.
pub fn overview_key(user_id: &str) -> String {
    format!("overview:{}", user_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_get_invalidate() {
        let cache = RouteCache::new(Duration::from_secs(60));
        let key = overview_key("user_1");

        assert!(cache.get(&key).await.is_none());

        cache.insert(key.clone(), json!({"total_banks": 2})).await;
        assert_eq!(cache.get(&key).await, Some(json!({"total_banks": 2})));

        cache.invalidate(&key).await;
        assert!(cache.get(&key).await.is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_is_miss() {
        let cache = RouteCache::new(Duration::ZERO);
        let key = overview_key("user_1");
        cache.insert(key.clone(), json!(1)).await;
        assert!(cache.get(&key).await.is_none());
    }
}
