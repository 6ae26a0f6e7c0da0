//! Dead-link validation for one page of search results.
//!
//! [`LinkValidator::validate`] checks every result's image URL, cache first:
//!
//! 1. Look up cached statuses.
//! 2. HEAD-probe the URLs with no cached status.
//! 3. Cache the fresh statuses, probe failures included.
//! 4. Classify every result with its provider's status mapping; drop the dead
//!    ones, keep live and ambiguous ones.
//! 5. Merge the page's liveness bits into the query's stored mask.
//!
//! Cache and network failures never fail a validation; the worst outcome is
//! probing more URLs than necessary.

mod blocking;
mod entry;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, warn};

use crate::cache::{CacheBackend, StatusCache};
use crate::config::{CacheExpiry, Config, PROBE_FAILED};
use crate::error_handling::{
    InitializationError, ValidationError, ValidationEvent, ValidationStats,
};
use crate::initialization::{init_cache_backend, init_probe_client, init_probe_limiter};
use crate::mask::{MaskStore, QueryMask};
use crate::probe::Prober;
use crate::provider::{LinkStatus, Liveness, ProviderStatusMappings};

pub use blocking::BlockingLinkValidator;
pub use entry::{SearchResult, SearchResultEntry};

/// Validates search results against cached and probed link liveness.
///
/// Create one per process and share it: its probe limiter is the
/// process-wide bound on in-flight probes.
pub struct LinkValidator {
    status_cache: StatusCache,
    prober: Prober,
    masks: MaskStore,
    mappings: ProviderStatusMappings,
    stats: Arc<ValidationStats>,
}

impl LinkValidator {
    /// Builds a validator around an existing cache backend.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::HttpClientError` if the probe client
    /// cannot be built.
    pub fn new(
        config: &Config,
        backend: Arc<dyn CacheBackend>,
        mappings: ProviderStatusMappings,
        expiry: CacheExpiry,
    ) -> Result<Self, InitializationError> {
        let stats = Arc::new(ValidationStats::new());
        let client = init_probe_client(config)?;
        let limiter =
            init_probe_limiter(config.max_concurrent_requests, config.acquire_timeout());
        let prober = Prober::new(
            client,
            limiter,
            config.probe_timeout(),
            config.user_agent(),
            Arc::clone(&stats),
        );
        Ok(Self::from_parts(
            StatusCache::new(Arc::clone(&backend), expiry, Arc::clone(&stats)),
            prober,
            MaskStore::new(backend, Arc::clone(&stats)),
            mappings,
            stats,
        ))
    }

    /// Builds a validator entirely from configuration: cache backend from
    /// `cache_db`, mappings from `provider_mappings` (or the built-in table),
    /// expiry from the environment.
    pub async fn from_config(config: &Config) -> Result<Self, InitializationError> {
        let backend = init_cache_backend(config).await?;
        let mappings = match &config.provider_mappings {
            Some(path) => ProviderStatusMappings::load(path)?,
            None => ProviderStatusMappings::builtin(),
        };
        Self::new(config, backend, mappings, CacheExpiry::from_env())
    }

    /// Assembles a validator from pre-built components.
    ///
    /// `stats` should be the same instance the components were given.
    pub fn from_parts(
        status_cache: StatusCache,
        prober: Prober,
        masks: MaskStore,
        mappings: ProviderStatusMappings,
        stats: Arc<ValidationStats>,
    ) -> Self {
        Self {
            status_cache,
            prober,
            masks,
            mappings,
            stats,
        }
    }

    /// Counters accumulated across every validation run by this validator.
    pub fn stats(&self) -> &Arc<ValidationStats> {
        &self.stats
    }

    /// Removes dead results and returns the survivors in their original order.
    ///
    /// `urls[i]` must be the image URL of `results[i]`. `offset` is the
    /// absolute position of `results[0]` in the query's full ordering.
    pub async fn validate<T: SearchResultEntry>(
        &self,
        query_hash: &str,
        offset: usize,
        mut results: Vec<T>,
        urls: &[String],
    ) -> Result<Vec<T>, ValidationError> {
        self.validate_in_place(query_hash, offset, &mut results, urls)
            .await?;
        Ok(results)
    }

    /// Like [`validate`](Self::validate), removing dead results from
    /// `results` directly. Returns the number removed.
    ///
    /// Every result is classified before any is removed, so on error
    /// `results` is left untouched.
    pub async fn validate_in_place<T: SearchResultEntry>(
        &self,
        query_hash: &str,
        offset: usize,
        results: &mut Vec<T>,
        urls: &[String],
    ) -> Result<usize, ValidationError> {
        if urls.is_empty() {
            info!("no image urls to validate");
            return Ok(0);
        }
        if urls.len() != results.len() {
            return Err(ValidationError::LengthMismatch {
                results: results.len(),
                urls: urls.len(),
            });
        }

        debug!("starting validation query={query_hash} offset={offset}");
        let start_time = Instant::now();

        let statuses = self.resolve_statuses(urls).await;

        let mut page_mask = QueryMask::all_live(results.len());
        let mut keep = vec![true; results.len()];
        for (idx, (entry, status)) in results.iter().zip(&statuses).enumerate() {
            let provider = entry.provider();
            match self.mappings.classify(provider, *status)? {
                Liveness::Live => {}
                Liveness::Unknown => {
                    self.stats.increment(ValidationEvent::UnknownKept);
                    warn!(
                        "Image validation failed due to rate limiting or blocking. \
                         url={} status={} provider={}",
                        urls[idx], status, provider
                    );
                }
                Liveness::Dead => {
                    info!(
                        "Deleting broken image from results id={} status={} provider={}",
                        entry.identifier(),
                        status,
                        provider
                    );
                    keep[idx] = false;
                    page_mask.mark_dead(idx);
                }
            }
        }

        let removed = page_mask.dead_count();
        let mut decisions = keep.into_iter();
        results.retain(|_| decisions.next().unwrap_or(true));
        self.stats.add(ValidationEvent::DeadRemoved, removed);

        let stored = self.masks.load(query_hash).await;
        let mask = QueryMask::reconcile(stored.as_ref(), offset, page_mask);
        self.masks.save(query_hash, &mask).await;

        debug!(
            "end validation removed={} kept={} delta={:.3}s",
            removed,
            results.len(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(removed)
    }

    /// Returns one status per URL: cached where known, otherwise probed and
    /// written back to the cache.
    async fn resolve_statuses(&self, urls: &[String]) -> Vec<LinkStatus> {
        let cached = self.status_cache.get_many(urls).await;

        // Each distinct uncached URL is probed once, however often it appears
        let mut to_verify: Vec<String> = Vec::new();
        let mut positions: HashMap<&str, Vec<usize>> = HashMap::new();
        for (idx, (url, status)) in urls.iter().zip(&cached).enumerate() {
            if status.is_none() {
                positions
                    .entry(url.as_str())
                    .or_insert_with(|| {
                        to_verify.push(url.clone());
                        Vec::new()
                    })
                    .push(idx);
            }
        }

        let hits = cached.iter().filter(|status| status.is_some()).count();
        self.stats.add(ValidationEvent::CacheHit, hits);
        self.stats.add(ValidationEvent::CacheMiss, to_verify.len());
        debug!("cached_statuses={} to_verify={}", hits, to_verify.len());

        let verified = self.prober.probe(&to_verify).await;
        self.status_cache.set_many(&verified).await;

        let mut statuses: Vec<LinkStatus> = cached
            .into_iter()
            .map(|status| status.unwrap_or(PROBE_FAILED))
            .collect();
        for (url, status) in &verified {
            if let Some(indices) = positions.get(url.as_str()) {
                for &idx in indices {
                    statuses[idx] = *status;
                }
            }
        }
        statuses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryCache;
    use crate::mask::MaskStore;
    use crate::provider::StatusMapping;
    use httptest::{matchers::*, responders::*, Expectation, Server};

    fn test_config() -> Config {
        Config {
            probe_timeout_ms: 500,
            acquire_timeout_ms: 500,
            ..Default::default()
        }
    }

    fn validator(backend: Arc<InMemoryCache>, mappings: ProviderStatusMappings) -> LinkValidator {
        LinkValidator::new(&test_config(), backend, mappings, CacheExpiry::default())
            .expect("validator builds")
    }

    #[tokio::test]
    async fn test_empty_urls_is_noop() {
        let backend = Arc::new(InMemoryCache::new());
        let validator = validator(backend.clone(), ProviderStatusMappings::strict());
        let results = vec![SearchResult::new("a", "unlisted", "https://x/a.jpg")];

        let out = validator
            .validate("q", 0, results.clone(), &[])
            .await
            .expect("no-op");
        assert_eq!(out, results);
        // Neither statuses nor a mask were written
        assert!(backend.is_empty().await);
    }

    #[tokio::test]
    async fn test_length_mismatch_rejected() {
        let validator = validator(
            Arc::new(InMemoryCache::new()),
            ProviderStatusMappings::builtin(),
        );
        let results = vec![SearchResult::new("a", "flickr", "https://x/a.jpg")];
        let urls = vec!["https://x/a.jpg".to_string(), "https://x/b.jpg".to_string()];

        let err = validator.validate("q", 0, results, &urls).await.unwrap_err();
        assert_eq!(
            err,
            ValidationError::LengthMismatch {
                results: 1,
                urls: 2
            }
        );
    }

    #[tokio::test]
    async fn test_unknown_provider_leaves_results_untouched() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method("HEAD"))
                .times(2)
                .respond_with(status_code(404)),
        );
        let mappings =
            ProviderStatusMappings::strict().with_provider("flickr", StatusMapping::default());
        let validator = validator(Arc::new(InMemoryCache::new()), mappings);

        let mut results = vec![
            SearchResult::new("a", "flickr", server.url("/a.jpg").to_string()),
            SearchResult::new("b", "museum", server.url("/b.jpg").to_string()),
        ];
        let urls: Vec<String> = results.iter().map(|r| r.url.clone()).collect();

        let err = validator
            .validate_in_place("q", 0, &mut results, &urls)
            .await
            .unwrap_err();
        assert_eq!(err, ValidationError::UnknownProvider("museum".to_string()));
        assert_eq!(results.len(), 2, "No entry removed on configuration error");
    }

    #[tokio::test]
    async fn test_duplicate_urls_probed_once() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("HEAD", "/same.jpg"))
                .times(1)
                .respond_with(status_code(404)),
        );
        let validator = validator(
            Arc::new(InMemoryCache::new()),
            ProviderStatusMappings::builtin(),
        );
        let url = server.url("/same.jpg").to_string();
        let results = vec![
            SearchResult::new("a", "flickr", url.clone()),
            SearchResult::new("b", "flickr", url.clone()),
        ];

        let out = validator
            .validate("q", 0, results, &[url.clone(), url])
            .await
            .unwrap();
        assert!(out.is_empty());
        assert_eq!(validator.stats().get(ValidationEvent::CacheMiss), 1);
        assert_eq!(validator.stats().get(ValidationEvent::DeadRemoved), 2);
    }

    #[tokio::test]
    async fn test_mask_written_through_store() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("HEAD", "/live.jpg"))
                .respond_with(status_code(200)),
        );
        server.expect(
            Expectation::matching(request::method_path("HEAD", "/dead.jpg"))
                .respond_with(status_code(404)),
        );
        let backend = Arc::new(InMemoryCache::new());
        let validator = validator(backend.clone(), ProviderStatusMappings::builtin());
        let results = vec![
            SearchResult::new("a", "met", server.url("/dead.jpg").to_string()),
            SearchResult::new("b", "met", server.url("/live.jpg").to_string()),
        ];
        let urls: Vec<String> = results.iter().map(|r| r.url.clone()).collect();

        validator.validate("q", 0, results, &urls).await.unwrap();

        let masks = MaskStore::new(backend, Arc::new(ValidationStats::new()));
        assert_eq!(
            masks.load("q").await,
            Some(QueryMask::from_bits(vec![false, true]))
        );
    }
}
