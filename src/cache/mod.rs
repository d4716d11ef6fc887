//! Read-through cache in front of the catalogue store.
//!
//! - `keys`: key scheme for cached query results
//! - `backend`: contract for the volatile key-value store
//! - `memory`: in-process backend with TTL expiry
//! - `handle`: backend lifecycle and failure fallback
//! - `read_through`: cache-aside reads and invalidation
//! - `planner`: which keys a write makes stale

mod backend;
mod config;
mod handle;
mod keys;
mod lock;
mod memory;
mod planner;
mod read_through;

pub use backend::{CacheBackend, CacheError};
pub use config::CacheConfig;
pub use handle::{CacheHandle, CacheLifecycle};
pub use keys::CacheKey;
pub use memory::MemoryCache;
pub use planner::{InvalidationPlan, WriteEvent};
pub use read_through::ReadThrough;
