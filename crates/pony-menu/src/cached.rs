//! Read-through and invalidation helpers shared by the services.

use pony_cache::{CacheError, CacheStore, get_json, set_json};
use pony_core::error::PonyResult;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Return the cached value for `key`, or load it, store it and return
/// it.
///
/// A corrupt entry fails the read. A backend failure on lookup falls
/// through to `load`, and a failure to store the loaded value is only
/// logged.
///
/// A load that read the store before a concurrent write committed can
/// populate the key after that write's invalidation; the stale entry
/// then lives until the TTL expires.
pub(crate) async fn read_through<C, T, F, Fut>(cache: &C, key: String, load: F) -> PonyResult<T>
where
    C: CacheStore,
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = PonyResult<T>>,
{
    match get_json::<_, T>(cache, &key).await {
        Ok(Some(hit)) => {
            debug!(key = %key, "Cache hit");
            return Ok(hit);
        }
        Ok(None) => debug!(key = %key, "Cache miss"),
        Err(e @ CacheError::Corrupt { .. }) => return Err(e.into()),
        Err(e) => warn!(key = %key, error = %e, "Cache lookup failed"),
    }

    let value = load().await?;

    if let Err(e) = set_json(cache, key.clone(), &value).await {
        warn!(key = %key, error = %e, "Failed to populate cache");
    }

    Ok(value)
}

/// Drop point keys and list prefixes after a successful write. The
/// write has already been committed, so failures are logged only.
pub(crate) async fn invalidate<C: CacheStore>(cache: &C, keys: &[String], prefixes: &[String]) {
    for key in keys {
        if let Err(e) = cache.delete(key).await {
            warn!(key = %key, error = %e, "Failed to invalidate cache key");
        }
    }
    for prefix in prefixes {
        if let Err(e) = cache.delete_prefix(prefix).await {
            warn!(prefix = %prefix, error = %e, "Failed to invalidate cache prefix");
        }
    }
}
