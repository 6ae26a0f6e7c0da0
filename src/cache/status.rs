//! Per-URL liveness status cache.

use std::sync::Arc;

use log::{debug, warn};

use super::{CacheBackend, CacheWrite};
use crate::config::{CacheExpiry, PROBE_FAILED, STATUS_CACHE_PREFIX};
use crate::error_handling::{ValidationEvent, ValidationStats};
use crate::provider::LinkStatus;

/// Cache key for a URL's status (`valid:<url>`).
pub fn status_key(url: &str) -> String {
    format!("{STATUS_CACHE_PREFIX}{url}")
}

/// Cached liveness status per URL, with per-status expiry.
///
/// Caching is best-effort: backend failures degrade to "nothing cached" on
/// read and to "nothing persisted" on write, and never reach the caller.
pub struct StatusCache {
    backend: Arc<dyn CacheBackend>,
    expiry: CacheExpiry,
    stats: Arc<ValidationStats>,
}

impl StatusCache {
    /// Creates a status cache writing through `backend` with TTLs from `expiry`.
    pub fn new(
        backend: Arc<dyn CacheBackend>,
        expiry: CacheExpiry,
        stats: Arc<ValidationStats>,
    ) -> Self {
        Self {
            backend,
            expiry,
            stats,
        }
    }

    /// Returns the cached status for each URL, in input order.
    pub async fn get_many(&self, urls: &[String]) -> Vec<Option<LinkStatus>> {
        if urls.is_empty() {
            return Vec::new();
        }

        let keys: Vec<String> = urls.iter().map(|url| status_key(url)).collect();
        match self.backend.get_many(&keys).await {
            Ok(values) => values
                .into_iter()
                .zip(urls)
                .map(|(value, url)| value.and_then(|v| parse_status(url, &v)))
                .collect(),
            Err(e) => {
                self.stats.increment(ValidationEvent::CacheUnavailable);
                warn!("Cache read failed, validating all URLs without cache: {e}");
                vec![None; urls.len()]
            }
        }
    }

    /// Caches each `(url, status)` pair with the expiry for its status.
    pub async fn set_many(&self, entries: &[(String, LinkStatus)]) {
        if entries.is_empty() {
            return;
        }

        let writes: Vec<CacheWrite> = entries
            .iter()
            .map(|(url, status)| {
                let key = status_key(url);
                match *status {
                    200 => debug!("healthy link key={key}"),
                    PROBE_FAILED => debug!("no response from provider key={key}"),
                    _ => debug!("broken link key={key}"),
                }
                let ttl = self.expiry.expiry_for(*status);
                debug!("caching status={status} expiry={}s", ttl.as_secs());
                CacheWrite::new(key, status.to_string(), ttl)
            })
            .collect();

        if let Err(e) = self.backend.set_many(&writes).await {
            self.stats.increment(ValidationEvent::CacheUnavailable);
            warn!("Cache write failed, cannot cache link liveness: {e}");
        }
    }
}

fn parse_status(url: &str, value: &str) -> Option<LinkStatus> {
    match value.trim().parse::<LinkStatus>() {
        Ok(status) => Some(status),
        Err(_) => {
            warn!("Ignoring unparseable cached status url={url} value={value:?}");
            None
        }
    }
}
