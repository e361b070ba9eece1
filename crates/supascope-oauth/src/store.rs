//! TTL'd session storage for authorization attempts and token sets.
//!
//! The store is keyed by an opaque correlation id (attempt id or session id)
//! carried in an HttpOnly cookie. Entries expire on their own deadline and
//! verifiers are consumed with [`SessionStore::take`] so a replayed callback
//! finds nothing.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;

/// Storage for session-scoped values with per-entry TTL.
///
/// Implementations must isolate entries per key; concurrent access to
/// different keys must not interfere.
#[async_trait]
pub trait SessionStore<T>: Send + Sync + std::fmt::Debug
where
    T: Clone + Send + Sync + 'static,
{
    /// Insert or replace a value under `key`, valid for `ttl`.
    async fn put(&self, key: &str, value: T, ttl: Duration) -> Result<()>;

    /// Read a value. Expired entries are treated as absent.
    async fn get(&self, key: &str) -> Result<Option<T>>;

    /// Remove and return a value, consuming it exactly once.
    async fn take(&self, key: &str) -> Result<Option<T>>;

    /// Remove a value.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Drop expired entries. Backends with native expiry may leave this as
    /// the default no-op.
    async fn purge_expired(&self) {}
}

/// Shared store handle for use across handlers.
pub type SharedStore<T> = Arc<dyn SessionStore<T>>;

struct Entry<T> {
    value: T,
    deadline: Instant,
}

impl<T> Entry<T> {
    fn expired(&self) -> bool {
        Instant::now() >= self.deadline
    }
}

/// In-memory store backed by a `tokio::sync::RwLock<HashMap>`.
pub struct MemoryStore<T> {
    entries: RwLock<HashMap<String, Entry<T>>>,
}

impl<T> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Drop every expired entry. Called periodically by the server so
    /// abandoned attempts do not accumulate.
    pub async fn purge_expired(&self) {
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| !entry.expired());
    }

    /// Number of live (unexpired) entries.
    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.values().filter(|e| !e.expired()).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for MemoryStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl<T> SessionStore<T> for MemoryStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn put(&self, key: &str, value: T, ttl: Duration) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            Entry {
                value,
                deadline: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<T>> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if !entry.expired() => return Ok(Some(entry.value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // Expired: drop it under the write lock.
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|e| e.expired()) {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn take(&self, key: &str) -> Result<Option<T>> {
        let mut entries = self.entries.write().await;
        match entries.remove(key) {
            Some(entry) if !entry.expired() => Ok(Some(entry.value)),
            _ => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }

    async fn purge_expired(&self) {
        MemoryStore::purge_expired(self).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_delete() {
        let store: MemoryStore<String> = MemoryStore::new();
        store
            .put("k", "v".to_string(), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));

        store.delete("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_take_consumes_exactly_once() {
        let store: MemoryStore<String> = MemoryStore::new();
        store
            .put("attempt", "verifier".to_string(), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(
            store.take("attempt").await.unwrap(),
            Some("verifier".to_string())
        );
        // A second take (code replay) finds nothing.
        assert_eq!(store.take("attempt").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_entry_is_absent() {
        let store: MemoryStore<u32> = MemoryStore::new();
        store.put("k", 1, Duration::from_millis(10)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(25)).await;

        assert_eq!(store.get("k").await.unwrap(), None);
        assert_eq!(store.take("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let store: MemoryStore<u32> = MemoryStore::new();
        store.put("a", 1, Duration::from_millis(10)).await.unwrap();
        store.put("b", 2, Duration::from_secs(60)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(25)).await;
        store.purge_expired().await;

        assert_eq!(store.len().await, 1);
        assert_eq!(store.get("b").await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_keys_are_isolated() {
        let store: MemoryStore<u32> = MemoryStore::new();
        store.put("a", 1, Duration::from_secs(60)).await.unwrap();
        store.put("b", 2, Duration::from_secs(60)).await.unwrap();

        store.take("a").await.unwrap();
        assert_eq!(store.get("b").await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_concurrent_access_different_keys() {
        let store = Arc::new(MemoryStore::<u32>::new());

        let mut handles = Vec::new();
        for i in 0..16u32 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let key = format!("key-{}", i);
                store.put(&key, i, Duration::from_secs(60)).await.unwrap();
                store.get(&key).await.unwrap()
            }));
        }

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.await.unwrap(), Some(i as u32));
        }
    }
}
