//! Per-query liveness masks.
//!
//! A [`QueryMask`] records, for every position in a query's full result
//! ordering that has been validated so far, whether that result was last seen
//! live (`1`) or filtered as dead (`0`). Later pages extend the mask; earlier
//! pages' bits are never rewritten by validating a later page.

mod hash;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

use crate::cache::{CacheBackend, CacheWrite};
use crate::config::{MASK_KEY_SUFFIX, MASK_TTL};
use crate::error_handling::{ValidationEvent, ValidationStats};

pub use hash::query_hash;

/// Liveness bit-vector for one query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryMask {
    bits: Vec<bool>,
}

impl QueryMask {
    /// A mask of `len` live positions.
    pub fn all_live(len: usize) -> Self {
        Self {
            bits: vec![true; len],
        }
    }

    /// Wraps explicit bits, `true` meaning live.
    pub fn from_bits(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// One bit per position, `true` meaning live.
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Number of positions covered.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Whether the mask covers no positions.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Whether position `index` is live. Out-of-range positions are unknown.
    pub fn is_live(&self, index: usize) -> Option<bool> {
        self.bits.get(index).copied()
    }

    /// Marks position `index` dead. Out-of-range indices are ignored.
    pub fn mark_dead(&mut self, index: usize) {
        if let Some(bit) = self.bits.get_mut(index) {
            *bit = false;
        }
    }

    /// Number of dead positions.
    pub fn dead_count(&self) -> usize {
        self.bits.iter().filter(|live| !**live).count()
    }

    /// Combines a stored mask with the mask computed for the page starting at
    /// `offset`.
    ///
    /// The stored prefix before `offset` is kept as-is and everything from
    /// `offset` on is replaced by `page`. A missing or empty stored mask
    /// yields `page` unchanged. A stored mask shorter than `offset`
    /// contributes only what it has.
    pub fn reconcile(existing: Option<&QueryMask>, offset: usize, page: QueryMask) -> QueryMask {
        match existing {
            Some(stored) if !stored.is_empty() => {
                let keep = offset.min(stored.len());
                let mut bits = Vec::with_capacity(keep + page.len());
                bits.extend_from_slice(&stored.bits[..keep]);
                bits.extend(page.bits);
                QueryMask { bits }
            }
            _ => page,
        }
    }

    /// Storage form: one `0`/`1` character per position.
    pub fn encode(&self) -> String {
        self.bits.iter().map(|live| if *live { '1' } else { '0' }).collect()
    }

    /// Parses the storage form; any other character makes the value invalid.
    pub fn decode(value: &str) -> Option<Self> {
        value
            .chars()
            .map(|c| match c {
                '1' => Some(true),
                '0' => Some(false),
                _ => None,
            })
            .collect::<Option<Vec<bool>>>()
            .map(Self::from_bits)
    }
}

impl fmt::Display for QueryMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

/// Cache key for a query's mask (`<query_hash>:dead_link_mask`).
pub fn mask_key(query_hash: &str) -> String {
    format!("{query_hash}{MASK_KEY_SUFFIX}")
}

/// Loads and saves query masks through the shared cache.
///
/// Best-effort like the status cache: a lost mask means the next validation
/// starts a fresh one at its own offset.
pub struct MaskStore {
    backend: Arc<dyn CacheBackend>,
    ttl: Duration,
    stats: Arc<ValidationStats>,
}

impl MaskStore {
    /// Creates a store whose masks expire after two hours.
    pub fn new(backend: Arc<dyn CacheBackend>, stats: Arc<ValidationStats>) -> Self {
        Self::with_ttl(backend, MASK_TTL, stats)
    }

    /// Creates a store with a custom mask time-to-live.
    pub fn with_ttl(
        backend: Arc<dyn CacheBackend>,
        ttl: Duration,
        stats: Arc<ValidationStats>,
    ) -> Self {
        Self {
            backend,
            ttl,
            stats,
        }
    }

    /// Returns the stored mask for `query_hash`, if any.
    pub async fn load(&self, query_hash: &str) -> Option<QueryMask> {
        let key = mask_key(query_hash);
        match self.backend.get_many(std::slice::from_ref(&key)).await {
            Ok(mut values) => {
                let value = values.pop().flatten()?;
                let mask = QueryMask::decode(&value);
                if mask.is_none() {
                    warn!("Discarding malformed query mask key={key}");
                }
                mask
            }
            Err(e) => {
                self.stats.increment(ValidationEvent::CacheUnavailable);
                warn!("Cache read failed, cannot get cached query mask: {e}");
                None
            }
        }
    }

    /// Replaces the stored mask for `query_hash`.
    pub async fn save(&self, query_hash: &str, mask: &QueryMask) {
        let key = mask_key(query_hash);
        debug!("saving query mask key={key} len={}", mask.len());
        let write = CacheWrite::new(key, mask.encode(), self.ttl);
        if let Err(e) = self.backend.set_many(std::slice::from_ref(&write)).await {
            self.stats.increment(ValidationEvent::CacheUnavailable);
            warn!("Cache write failed, cannot cache query mask: {e}");
        }
    }
}
