//! Cache backend selection and connection lifecycle.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::cache::{CacheBackend, CacheError, CacheHandle, CacheLifecycle, MemoryCache};
use crate::config::CacheSettings;

use super::redis_cache::RedisCache;

const MEMORY_URL: &str = "memory://";

/// Build a backend for `url`: `memory://` for the in-process map, `redis://`
/// or `rediss://` for Redis.
pub async fn connect_backend(
    url: &str,
    connect_timeout: Duration,
) -> Result<Arc<dyn CacheBackend>, CacheError> {
    if url == MEMORY_URL {
        return Ok(Arc::new(MemoryCache::new()));
    }

    match scheme(url) {
        "redis" | "rediss" => {
            let backend = RedisCache::connect(url, connect_timeout).await?;
            Ok(Arc::new(backend))
        }
        other => Err(CacheError::backend(format!(
            "unsupported cache url scheme `{other}`"
        ))),
    }
}

/// Attach a backend to `handle` according to `settings`.
///
/// A disabled or unconfigured cache leaves the handle uninitialized; a failed
/// connection leaves it disconnected. Neither is fatal.
pub async fn establish(handle: &CacheHandle, settings: &CacheSettings) -> CacheLifecycle {
    let Some(url) = settings.active_url() else {
        warn!(
            enabled = settings.enabled,
            "Cache not configured; serving every read from the store"
        );
        return handle.lifecycle();
    };

    match connect_backend(url, settings.connect_timeout).await {
        Ok(backend) => handle.attach(backend),
        Err(err) => {
            warn!(
                scheme = scheme(url),
                error = %err,
                "Cache connection failed; continuing without cache"
            );
            handle.detach();
        }
    }

    handle.lifecycle()
}

/// Periodically retry the connection while the handle is disconnected.
///
/// Returns `None` when retries are disabled or there is nothing to connect to.
pub fn spawn_reconnect(handle: CacheHandle, settings: CacheSettings) -> Option<JoinHandle<()>> {
    let interval = settings.reconnect_interval?;
    let url = settings.active_url()?.to_string();

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if handle.lifecycle() == CacheLifecycle::Connected {
                continue;
            }

            match connect_backend(&url, settings.connect_timeout).await {
                Ok(backend) => {
                    info!(scheme = scheme(&url), "Cache reconnected");
                    handle.attach(backend);
                }
                Err(err) => warn!(error = %err, "Cache reconnect attempt failed"),
            }
        }
    }))
}

/// URL scheme only; the rest may carry credentials.
fn scheme(url: &str) -> &str {
    url.split_once("://").map_or("", |(scheme, _)| scheme)
}
