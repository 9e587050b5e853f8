use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use sha1::{Digest, Sha1};
use tokio::sync::RwLock;

use crate::db::error::Result;
use crate::db::value::Value;

/// 缓存存储接口 / Cache store
///
/// 标签把键分组，`flush(Some(tag))` 只清空该组，`flush(None)` 清空全部
/// Tags group keys: `flush(Some(tag))` clears that group, `flush(None)` clears everything
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, tag: Option<&str>, key: &str) -> Option<serde_json::Value>;
    async fn put(&self, tag: Option<&str>, key: &str, value: serde_json::Value, ttl: Duration);
    async fn flush(&self, tag: Option<&str>);
}

/// 命中返回缓存，否则执行 `load` 并写入
/// Return the cached value, or run `load` and store its result
pub async fn remember<F, Fut>(
    store: &dyn CacheStore,
    tag: Option<&str>,
    key: &str,
    ttl: Duration,
    load: F,
) -> Result<serde_json::Value>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<serde_json::Value>>,
{
    if let Some(hit) = store.get(tag, key).await {
        tracing::debug!(key, "cache hit");
        return Ok(hit);
    }
    let value = load().await?;
    store.put(tag, key, value.clone(), ttl).await;
    Ok(value)
}

/// 缓存键：`sha1(库名|SQL|绑定值)` / Cache key: `sha1(database|sql|binds)`
pub fn cache_key(database: &str, sql: &str, binds: &[Value]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(database.as_bytes());
    hasher.update(b"|");
    hasher.update(sql.as_bytes());
    for b in binds {
        hasher.update(b"|");
        hasher.update(b.to_sql_literal().as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

type Bucket = HashMap<String, (Instant, serde_json::Value)>;

/// 进程内 TTL 缓存 / In-process TTL cache
#[derive(Default)]
pub struct MemoryCache {
    buckets: RwLock<HashMap<String, Bucket>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.buckets.read().await.values().map(|b| b.len()).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, tag: Option<&str>, key: &str) -> Option<serde_json::Value> {
        let buckets = self.buckets.read().await;
        let (expires_at, value) = buckets.get(tag.unwrap_or(""))?.get(key)?;
        if Instant::now() >= *expires_at {
            return None;
        }
        Some(value.clone())
    }

    async fn put(&self, tag: Option<&str>, key: &str, value: serde_json::Value, ttl: Duration) {
        let mut buckets = self.buckets.write().await;
        let bucket = buckets.entry(tag.unwrap_or("").to_string()).or_default();
        let now = Instant::now();
        bucket.retain(|_, (expires_at, _)| *expires_at > now);
        bucket.insert(key.to_string(), (now + ttl, value));
    }

    async fn flush(&self, tag: Option<&str>) {
        let mut buckets = self.buckets.write().await;
        match tag {
            Some(t) => {
                buckets.remove(t);
            }
            None => buckets.clear(),
        }
    }
}

/// 仓库的缓存设置 / Repository cache settings
#[derive(Clone)]
pub struct CacheSettings {
    pub store: Arc<dyn CacheStore>,
    pub ttl: Duration,
    pub tag: Option<String>,
}

impl CacheSettings {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            tag: None,
        }
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tag = Some(tag.to_string());
        self
    }
}

impl std::fmt::Debug for CacheSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheSettings")
            .field("ttl", &self.ttl)
            .field("tag", &self.tag)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_cache_ttl() {
        let cache = MemoryCache::new();
        cache.put(None, "k", json!(1), Duration::from_millis(30)).await;
        assert_eq!(cache.get(None, "k").await, Some(json!(1)));
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(cache.get(None, "k").await, None);
    }

    #[tokio::test]
    async fn test_flush_by_tag() {
        let cache = MemoryCache::new();
        let ttl = Duration::from_secs(60);
        cache.put(Some("users"), "a", json!("u"), ttl).await;
        cache.put(Some("posts"), "a", json!("p"), ttl).await;
        cache.flush(Some("users")).await;
        assert_eq!(cache.get(Some("users"), "a").await, None);
        assert_eq!(cache.get(Some("posts"), "a").await, Some(json!("p")));
        cache.flush(None).await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_remember_loads_once() {
        let cache = MemoryCache::new();
        let ttl = Duration::from_secs(60);
        let first = remember(&cache, None, "k", ttl, || async {
            Ok::<_, crate::db::error::DbError>(json!([1, 2]))
        })
            .await
            .unwrap();
        let second = remember(&cache, None, "k", ttl, || async {
            Ok::<_, crate::db::error::DbError>(json!("not called"))
        })
        .await
        .unwrap();
        assert_eq!(first, json!([1, 2]));
        assert_eq!(second, json!([1, 2]));
    }

    #[test]
    fn test_cache_key_depends_on_binds() {
        let a = cache_key("db", "SELECT 1 WHERE a = ?", &[Value::Int(1)]);
        let b = cache_key("db", "SELECT 1 WHERE a = ?", &[Value::Int(2)]);
        let c = cache_key("other", "SELECT 1 WHERE a = ?", &[Value::Int(1)]);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 40);
    }
}
