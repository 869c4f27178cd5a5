//! Cache storage trait and the moka-backed implementation.

use std::time::Duration;

use moka::future::Cache;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::CacheError;

/// A string-keyed store of serialized values with a fixed TTL.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, CacheError>> + Send;
    fn set(
        &self,
        key: String,
        value: String,
    ) -> impl Future<Output = Result<(), CacheError>> + Send;
    fn delete(&self, key: &str) -> impl Future<Output = Result<(), CacheError>> + Send;
    /// Remove every entry whose key starts with `prefix`.
    fn delete_prefix(&self, prefix: &str) -> impl Future<Output = Result<(), CacheError>> + Send;
}

/// In-process cache backed by `moka`.
#[derive(Clone)]
pub struct MokaCacheStore {
    inner: Cache<String, String>,
}

impl MokaCacheStore {
    pub const DEFAULT_TTL: Duration = Duration::from_secs(600);
    pub const DEFAULT_MAX_ENTRIES: u64 = 10_000;

    pub fn new(ttl: Duration, max_entries: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .support_invalidation_closures()
            .build();
        Self { inner }
    }

    /// Approximate number of live entries.
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

impl Default for MokaCacheStore {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TTL, Self::DEFAULT_MAX_ENTRIES)
    }
}

impl CacheStore for MokaCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.inner.get(key).await)
    }

    async fn set(&self, key: String, value: String) -> Result<(), CacheError> {
        self.inner.insert(key, value).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.inner.invalidate(key).await;
        Ok(())
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<(), CacheError> {
        let owned = prefix.to_string();
        self.inner
            .invalidate_entries_if(move |key, _| key.starts_with(&owned))
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        self.inner.run_pending_tasks().await;
        debug!(prefix, "Invalidated cache prefix");
        Ok(())
    }
}

/// Fetch and decode a JSON value. A present but undecodable entry is
/// [`CacheError::Corrupt`].
pub async fn get_json<C, T>(cache: &C, key: &str) -> Result<Option<T>, CacheError>
where
    C: CacheStore,
    T: DeserializeOwned,
{
    let Some(raw) = cache.get(key).await? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| CacheError::Corrupt {
            key: key.to_string(),
            reason: e.to_string(),
        })
}

/// Encode `value` as JSON and store it under `key`.
pub async fn set_json<C, T>(cache: &C, key: String, value: &T) -> Result<(), CacheError>
where
    C: CacheStore,
    T: Serialize,
{
    let raw = serde_json::to_string(value).map_err(|e| CacheError::Encode(e.to_string()))?;
    cache.set(key, raw).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys;
    use pony_core::error::PonyError;
    use pony_core::models::tenant::TenantId;
    use serde::Deserialize;
    use uuid::Uuid;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Menu {
        items: Vec<String>,
    }

    #[tokio::test]
    async fn set_then_get_json() {
        let cache = MokaCacheStore::default();
        let menu = Menu {
            items: vec!["Ale".into()],
        };
        set_json(&cache, "menu".into(), &menu).await.unwrap();
        let got: Option<Menu> = get_json(&cache, "menu").await.unwrap();
        assert_eq!(got, Some(menu));

        let missing: Option<Menu> = get_json(&cache, "nothing").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn corrupt_entry_is_internal() {
        let cache = MokaCacheStore::default();
        cache.set("menu".into(), "{not json".into()).await.unwrap();

        let err = get_json::<_, Menu>(&cache, "menu").await.unwrap_err();
        assert!(matches!(err, CacheError::Corrupt { .. }));
        assert!(matches!(PonyError::from(err), PonyError::Internal(_)));
    }

    #[tokio::test]
    async fn delete_removes_point_key() {
        let cache = MokaCacheStore::default();
        cache.set("k".into(), "1".into()).await.unwrap();
        cache.delete("k").await.unwrap();
        assert!(cache.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn prefix_delete_clears_one_tenant_family() {
        let cache = MokaCacheStore::default();
        let ours = TenantId(Uuid::new_v4());
        let theirs = TenantId(Uuid::new_v4());

        for page in 1..=3 {
            cache
                .set(keys::dishes(ours, page, 10), "[]".into())
                .await
                .unwrap();
        }
        cache
            .set(keys::dishes(theirs, 1, 10), "[]".into())
            .await
            .unwrap();
        let point = keys::dish(ours, Uuid::new_v4());
        cache.set(point.clone(), "{}".into()).await.unwrap();

        cache.delete_prefix(&keys::dishes_prefix(ours)).await.unwrap();

        for page in 1..=3 {
            assert!(cache.get(&keys::dishes(ours, page, 10)).await.unwrap().is_none());
        }
        assert!(cache.get(&keys::dishes(theirs, 1, 10)).await.unwrap().is_some());
        assert!(cache.get(&point).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let cache = MokaCacheStore::new(Duration::from_millis(50), 100);
        cache.set("k".into(), "1".into()).await.unwrap();
        assert!(cache.get("k").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(cache.get("k").await.unwrap().is_none());
    }
}
