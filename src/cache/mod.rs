//! Shared, best-effort key/value cache.
//!
//! The engine talks to its cache through [`CacheBackend`], injected into the
//! validator at construction. Two backends are provided:
//! - [`InMemoryCache`]: process-local, for single-instance deployments and tests
//! - [`SqliteCache`]: a SQLite file shared by every process on the host
//!
//! On top of a backend sit the [`StatusCache`] (per-URL liveness) and the mask
//! store in [`crate::mask`]. Neither lets a backend failure reach the caller.

mod memory;
mod sqlite;
mod status;

use std::time::Duration;

use async_trait::async_trait;

use crate::error_handling::CacheError;

pub use memory::InMemoryCache;
pub use sqlite::{init_cache_pool, SqliteCache};
pub use status::{status_key, StatusCache};

/// A single write: value plus its time-to-live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheWrite {
    /// Cache key
    pub key: String,
    /// Value stored under `key`
    pub value: String,
    /// Time until the entry expires
    pub ttl: Duration,
}

impl CacheWrite {
    /// Creates a write of `value` under `key` expiring after `ttl`.
    pub fn new(key: impl Into<String>, value: impl Into<String>, ttl: Duration) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            ttl,
        }
    }
}

/// Get-many / set-many-with-expiry interface over a shared cache.
///
/// Entries are authoritative until their TTL elapses; there is no other
/// freshness check. Implementations report outages as errors and leave
/// degradation policy to the caller.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Returns the live value for each key, in input order.
    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>, CacheError>;

    /// Writes every entry and sets its expiry.
    async fn set_many(&self, writes: &[CacheWrite]) -> Result<(), CacheError>;
}
