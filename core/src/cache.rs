//! In-memory query result cache.
//!
//! Holds the last successful `data` payload per operation name for the
//! lifetime of the client. Clones share the same storage.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a screen uses the cache when it mounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchPolicy {
    /// Serve cached data when present, otherwise fetch.
    #[default]
    CacheFirst,
    /// Always fetch; the result still refreshes the cache.
    NetworkOnly,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryCache {
    entries: Arc<Mutex<HashMap<String, Value>>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Value>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn read(&self, operation_name: &str) -> Option<Value> {
        self.entries().get(operation_name).cloned()
    }

    pub fn write(&self, operation_name: &str, data: Value) {
        self.entries().insert(operation_name.to_string(), data);
    }

    pub fn evict(&self, operation_name: &str) -> bool {
        self.entries().remove(operation_name).is_some()
    }

    pub fn clear(&self) {
        self.entries().clear();
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn write_then_read() {
        let cache = InMemoryCache::new();
        assert!(cache.read("GetExperts").is_none());
        cache.write("GetExperts", json!({"experts": []}));
        assert_eq!(cache.read("GetExperts"), Some(json!({"experts": []})));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clones_share_storage() {
        let cache = InMemoryCache::new();
        let other = cache.clone();
        other.write("GetExperts", json!(1));
        assert_eq!(cache.read("GetExperts"), Some(json!(1)));
    }

    #[test]
    fn evict_and_clear() {
        let cache = InMemoryCache::new();
        cache.write("a", json!(1));
        cache.write("b", json!(2));
        assert!(cache.evict("a"));
        assert!(!cache.evict("a"));
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn fetch_policy_names() {
        let policy: FetchPolicy = serde_json::from_str(r#""network-only""#).unwrap();
        assert_eq!(policy, FetchPolicy::NetworkOnly);
        assert_eq!(FetchPolicy::default(), FetchPolicy::CacheFirst);
    }
}
