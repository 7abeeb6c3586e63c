use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

struct CacheState<K, V> {
    entries: HashMap<K, V>,
    hits: u64,
    misses: u64,
}

/// Memoizes computed results. Keys must identify their inputs completely,
/// so entries never need invalidation.
#[derive(Clone)]
pub struct Cache<K, V> {
    inner: Arc<Mutex<CacheState<K, V>>>,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Send + Sync + std::fmt::Debug,
    V: Clone + Send + Sync,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(CacheState {
                entries: HashMap::new(),
                hits: 0,
                misses: 0,
            })),
        }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let mut cache = self.inner.lock().await;
        let value = cache.entries.get(key).cloned();
        if value.is_some() {
            cache.hits += 1;
            debug!("Cache HIT for key: {:?}", key);
        } else {
            cache.misses += 1;
            debug!("Cache MISS for key: {:?}", key);
        }
        value
    }

    pub async fn put(&self, key: K, value: V) {
        let mut cache = self.inner.lock().await;
        debug!("Cache PUT for key: {:?}", key);
        cache.entries.insert(key, value);
    }

    /// Returns the cached value for `key`, computing and storing it on a miss.
    /// Errors are returned as-is and not cached.
    pub async fn get_or_try_insert_with<E, F, Fut>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key).await {
            return Ok(value);
        }
        let value = compute().await?;
        self.put(key, value.clone()).await;
        Ok(value)
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// `(hits, misses)` since creation.
    pub async fn stats(&self) -> (u64, u64) {
        let cache = self.inner.lock().await;
        (cache.hits, cache.misses)
    }
}

impl<K, V> Default for Cache<K, V>
where
    K: Eq + Hash + Send + Sync + std::fmt::Debug,
    V: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cache_get_put() {
        let cache = Cache::<String, i32>::new();

        assert!(cache.get(&"key1".to_string()).await.is_none());
        cache.put("key1".to_string(), 123).await;
        assert_eq!(cache.get(&"key1".to_string()).await, Some(123));
        assert!(cache.get(&"key2".to_string()).await.is_none());
        assert_eq!(cache.stats().await, (1, 2));
    }

    #[tokio::test]
    async fn test_get_or_try_insert_with_computes_once() {
        let cache = Cache::<u32, String>::new();
        let mut calls = 0;

        let first: Result<String, ()> = cache
            .get_or_try_insert_with(7, || {
                calls += 1;
                async { Ok("seven".to_string()) }
            })
            .await;
        assert_eq!(first.unwrap(), "seven");

        let second: Result<String, ()> = cache
            .get_or_try_insert_with(7, || async { Ok("other".to_string()) })
            .await;
        assert_eq!(second.unwrap(), "seven");
        assert_eq!(calls, 1);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache = Cache::<u32, i32>::new();
        let failed = cache
            .get_or_try_insert_with(1, || async { Err::<i32, &str>("boom") })
            .await;
        assert_eq!(failed, Err("boom"));
        assert!(cache.is_empty().await);
    }
}
