//! Cache-aside reads and write-side invalidation.
//!
//! A lookup that fails for any reason (backend down, timeout, payload that no
//! longer deserializes) counts as a miss and falls through to the loader. A
//! failed population is logged by the handle and otherwise ignored.

use std::future::Future;
use std::time::Instant;

use metrics::{counter, histogram};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::config::CacheConfig;
use super::handle::CacheHandle;
use super::keys::CacheKey;

const METRIC_CACHE_HIT: &str = "folio_cache_hit_total";
const METRIC_CACHE_MISS: &str = "folio_cache_miss_total";
const METRIC_CACHE_MALFORMED: &str = "folio_cache_malformed_total";
const METRIC_CACHE_INVALIDATE: &str = "folio_cache_invalidate_total";
const METRIC_STORE_LOAD_MS: &str = "folio_store_load_ms";

#[derive(Clone)]
pub struct ReadThrough {
    cache: CacheHandle,
    config: CacheConfig,
}

impl ReadThrough {
    pub fn new(cache: CacheHandle, config: CacheConfig) -> Self {
        Self { cache, config }
    }

    pub fn handle(&self) -> &CacheHandle {
        &self.cache
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Serve `key` from the cache, or run `loader` and populate the cache with
    /// its result. Loader errors are returned untouched and never cached.
    pub async fn read_through<T, E, F, Fut>(&self, key: CacheKey, loader: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.lookup(&key).await {
            return Ok(value);
        }

        let value = self.load(&key, loader).await?;
        self.populate(&key, &value).await;
        Ok(value)
    }

    /// Like [`read_through`](Self::read_through), but only a present result is
    /// stored. An absent one is returned without touching the cache.
    pub async fn read_through_optional<T, E, F, Fut>(
        &self,
        key: CacheKey,
        loader: F,
    ) -> Result<Option<T>, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<T>, E>>,
    {
        if let Some(value) = self.lookup(&key).await {
            return Ok(Some(value));
        }

        let value = self.load(&key, loader).await?;
        if let Some(found) = value.as_ref() {
            self.populate(&key, found).await;
        }
        Ok(value)
    }

    /// Delete `keys` in order. Each delete stands alone; one failing does not
    /// stop the rest.
    pub async fn invalidate(&self, keys: &[CacheKey]) {
        for key in keys {
            self.cache.delete(key).await;
            counter!(METRIC_CACHE_INVALIDATE, "family" => key.family()).increment(1);
            debug!(key = %key, "Cache key invalidated");
        }
    }

    async fn lookup<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let Some(raw) = self.cache.get(key).await else {
            counter!(METRIC_CACHE_MISS, "family" => key.family()).increment(1);
            return None;
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                counter!(METRIC_CACHE_HIT, "family" => key.family()).increment(1);
                debug!(key = %key, "Cache hit");
                Some(value)
            }
            Err(error) => {
                counter!(METRIC_CACHE_MALFORMED, "family" => key.family()).increment(1);
                counter!(METRIC_CACHE_MISS, "family" => key.family()).increment(1);
                warn!(key = %key, error = %error, "Cached payload did not deserialize; reloading");
                None
            }
        }
    }

    async fn load<T, E, F, Fut>(&self, key: &CacheKey, loader: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let started_at = Instant::now();
        let result = loader().await;
        histogram!(METRIC_STORE_LOAD_MS, "family" => key.family())
            .record(started_at.elapsed().as_secs_f64() * 1000.0);
        result
    }

    async fn populate<T: Serialize>(&self, key: &CacheKey, value: &T) {
        match serde_json::to_string(value) {
            Ok(payload) => self.cache.set(key, &payload, self.config.ttl).await,
            Err(error) => {
                warn!(key = %key, error = %error, "Failed to serialize value for cache");
            }
        }
    }
}
