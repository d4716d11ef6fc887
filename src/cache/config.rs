//! Cache configuration.
//!
//! Controls TTL and per-operation timeout of the read-through layer.

use std::time::Duration;

const DEFAULT_TTL_SECS: u64 = 300;
const DEFAULT_OP_TIMEOUT_MS: u64 = 250;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Lifetime of every populated entry.
    pub ttl: Duration,
    /// Upper bound for a single get/set/delete against the backend.
    pub op_timeout: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_TTL_SECS),
            op_timeout: Duration::from_millis(DEFAULT_OP_TIMEOUT_MS),
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            ttl: settings.ttl,
            op_timeout: settings.op_timeout,
        }
    }
}
