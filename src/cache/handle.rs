//! Failure-fallback wrapper around the cache backend.
//!
//! Every get/set/delete goes through [`CacheHandle::guarded`], which turns a
//! missing backend, a backend error or a timeout into "absent" / no-op. Callers
//! never see a cache failure.

use std::future::Future;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use metrics::counter;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::backend::{CacheBackend, CacheError};
use super::keys::CacheKey;
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::handle";
const METRIC_CACHE_ERROR: &str = "folio_cache_error_total";

/// Where the cache backend is in its process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheLifecycle {
    /// No connection was ever attempted (cache disabled or not configured).
    Uninitialized,
    Connected,
    /// A connection attempt failed or the backend was detached.
    Disconnected,
}

impl CacheLifecycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheLifecycle::Uninitialized => "uninitialized",
            CacheLifecycle::Connected => "connected",
            CacheLifecycle::Disconnected => "disconnected",
        }
    }
}

struct Slot {
    lifecycle: CacheLifecycle,
    backend: Option<Arc<dyn CacheBackend>>,
}

/// Shared, cloneable handle to the (possibly absent) cache backend.
///
/// The backend can be attached and detached at any time; in-flight operations
/// keep the backend they started with.
#[derive(Clone)]
pub struct CacheHandle {
    slot: Arc<RwLock<Slot>>,
    op_timeout: Duration,
}

impl CacheHandle {
    pub fn new(op_timeout: Duration) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Slot {
                lifecycle: CacheLifecycle::Uninitialized,
                backend: None,
            })),
            op_timeout,
        }
    }

    pub fn connected(backend: Arc<dyn CacheBackend>, op_timeout: Duration) -> Self {
        let handle = Self::new(op_timeout);
        handle.attach(backend);
        handle
    }

    pub fn attach(&self, backend: Arc<dyn CacheBackend>) {
        let name = backend.name();
        let mut slot = rw_write(&self.slot, SOURCE, "attach");
        slot.backend = Some(backend);
        slot.lifecycle = CacheLifecycle::Connected;
        info!(backend = name, "Cache backend attached");
    }

    /// Drop the backend and mark the cache as disconnected.
    pub fn detach(&self) -> Option<Arc<dyn CacheBackend>> {
        let mut slot = rw_write(&self.slot, SOURCE, "detach");
        slot.lifecycle = CacheLifecycle::Disconnected;
        let previous = slot.backend.take();
        if let Some(backend) = previous.as_ref() {
            info!(backend = backend.name(), "Cache backend detached");
        }
        previous
    }

    pub fn lifecycle(&self) -> CacheLifecycle {
        rw_read(&self.slot, SOURCE, "lifecycle").lifecycle
    }

    pub fn backend_name(&self) -> Option<&'static str> {
        rw_read(&self.slot, SOURCE, "backend_name")
            .backend
            .as_ref()
            .map(|backend| backend.name())
    }

    pub fn op_timeout(&self) -> Duration {
        self.op_timeout
    }

    pub async fn get(&self, key: &CacheKey) -> Option<String> {
        self.guarded("get", key, |backend, raw| async move {
            backend.get(&raw).await
        })
        .await
        .flatten()
    }

    pub async fn set(&self, key: &CacheKey, value: &str, ttl: Duration) {
        self.guarded("set", key, |backend, raw| async move {
            backend.set_ex(&raw, value, ttl).await
        })
        .await;
    }

    pub async fn delete(&self, key: &CacheKey) {
        self.guarded("delete", key, |backend, raw| async move {
            backend.delete(&raw).await
        })
        .await;
    }

    fn backend(&self) -> Option<Arc<dyn CacheBackend>> {
        rw_read(&self.slot, SOURCE, "backend").backend.clone()
    }

    /// Run one backend operation, converting every failure into `None`.
    async fn guarded<T, F, Fut>(&self, op: &'static str, key: &CacheKey, call: F) -> Option<T>
    where
        F: FnOnce(Arc<dyn CacheBackend>, String) -> Fut,
        Fut: Future<Output = Result<T, CacheError>>,
    {
        let Some(backend) = self.backend() else {
            debug!(op, key = %key, "Cache backend absent; skipping");
            return None;
        };
        let name = backend.name();

        let result = match timeout(self.op_timeout, call(backend, key.to_string())).await {
            Ok(result) => result,
            Err(_) => Err(CacheError::Timeout {
                op,
                timeout: self.op_timeout,
            }),
        };

        match result {
            Ok(value) => Some(value),
            Err(error) => {
                counter!(METRIC_CACHE_ERROR, "op" => op).increment(1);
                warn!(
                    op,
                    key = %key,
                    backend = name,
                    error = %error,
                    "Cache operation failed; falling back"
                );
                None
            }
        }
    }
}
