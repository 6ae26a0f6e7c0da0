//! Process-local cache backend.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CacheBackend, CacheWrite};
use crate::error_handling::CacheError;

/// Upper bound on an entry's lifetime; longer TTLs are clamped to it.
const MAX_ENTRY_LIFETIME: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// In-memory [`CacheBackend`] with per-entry expiry.
///
/// Expired entries are invisible to reads and dropped on the next write, by
/// [`purge_expired`], or when overwritten.
///
/// [`purge_expired`]: InMemoryCache::purge_expired
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<String, (String, Instant)>>,
}

impl InMemoryCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes expired entries, returning how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        drop_expired(&mut entries, now)
    }

    /// Number of stored entries, expired or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether no entries are stored, expired or not.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CacheBackend for InMemoryCache {
    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>, CacheError> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        Ok(keys
            .iter()
            .map(|key| match entries.get(key) {
                Some((value, expires_at)) if *expires_at > now => Some(value.clone()),
                _ => None,
            })
            .collect())
    }

    async fn set_many(&self, writes: &[CacheWrite]) -> Result<(), CacheError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        drop_expired(&mut entries, now);
        for write in writes {
            entries.insert(
                write.key.clone(),
                (write.value.clone(), expires_at(now, write.ttl)),
            );
        }
        Ok(())
    }
}

fn drop_expired(entries: &mut HashMap<String, (String, Instant)>, now: Instant) -> usize {
    let before = entries.len();
    entries.retain(|_, (_, expires_at)| *expires_at > now);
    before - entries.len()
}

/// `now + ttl`, clamped so an oversized TTL cannot overflow `Instant`.
fn expires_at(now: Instant, ttl: Duration) -> Instant {
    now.checked_add(ttl.min(MAX_ENTRY_LIFETIME)).unwrap_or(now)
}
