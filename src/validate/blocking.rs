//! Synchronous validation for callers outside an async runtime.

use std::sync::Arc;

use tokio::runtime::{Builder, Runtime};

use super::{LinkValidator, SearchResultEntry};
use crate::cache::CacheBackend;
use crate::config::{CacheExpiry, Config};
use crate::error_handling::{InitializationError, ValidationError, ValidationStats};
use crate::provider::ProviderStatusMappings;

/// A [`LinkValidator`] driven by its own multi-threaded runtime.
///
/// The probe client's connection pool is bound to the runtime it was created
/// on, so the validator is built and always run on the owned runtime. Must not
/// be called from inside another tokio runtime.
pub struct BlockingLinkValidator {
    inner: LinkValidator,
    runtime: Runtime,
}

impl BlockingLinkValidator {
    /// Builds a blocking validator around an existing cache backend.
    pub fn new(
        config: &Config,
        backend: Arc<dyn CacheBackend>,
        mappings: ProviderStatusMappings,
        expiry: CacheExpiry,
    ) -> Result<Self, InitializationError> {
        let runtime = build_runtime()?;
        let inner = {
            let _guard = runtime.enter();
            LinkValidator::new(config, backend, mappings, expiry)?
        };
        Ok(Self { inner, runtime })
    }

    /// Builds a blocking validator entirely from configuration.
    pub fn from_config(config: &Config) -> Result<Self, InitializationError> {
        let runtime = build_runtime()?;
        let inner = runtime.block_on(LinkValidator::from_config(config))?;
        Ok(Self { inner, runtime })
    }

    /// Blocks until the page is validated; see [`LinkValidator::validate`].
    pub fn validate<T: SearchResultEntry>(
        &self,
        query_hash: &str,
        offset: usize,
        results: Vec<T>,
        urls: &[String],
    ) -> Result<Vec<T>, ValidationError> {
        self.runtime
            .block_on(self.inner.validate(query_hash, offset, results, urls))
    }

    /// Counters accumulated across every validation.
    pub fn stats(&self) -> &Arc<ValidationStats> {
        self.inner.stats()
    }
}

fn build_runtime() -> std::io::Result<Runtime> {
    Builder::new_multi_thread()
        .enable_all()
        .thread_name("link-validation")
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryCache;
    use crate::error_handling::ValidationEvent;
    use crate::validate::SearchResult;
    use httptest::{matchers::*, responders::*, Expectation, Server};

    #[test]
    fn test_blocking_validate_from_sync_code() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("HEAD", "/live.jpg"))
                .times(1)
                .respond_with(status_code(200)),
        );
        server.expect(
            Expectation::matching(request::method_path("HEAD", "/dead.jpg"))
                .times(1)
                .respond_with(status_code(404)),
        );

        let validator = BlockingLinkValidator::new(
            &Config::default(),
            Arc::new(InMemoryCache::new()),
            ProviderStatusMappings::builtin(),
            CacheExpiry::default(),
        )
        .expect("validator builds");

        let results = vec![
            SearchResult::new("live", "flickr", server.url("/live.jpg").to_string()),
            SearchResult::new("dead", "flickr", server.url("/dead.jpg").to_string()),
        ];
        let urls: Vec<String> = results.iter().map(|r| r.url.clone()).collect();

        let survivors = validator.validate("q", 0, results, &urls).unwrap();
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].identifier, "live");

        // Second call is served entirely from the cache
        let again = vec![SearchResult::new("live", "flickr", urls[0].clone())];
        let survivors = validator.validate("q", 0, again, &urls[..1]).unwrap();
        assert_eq!(survivors.len(), 1);
        assert_eq!(validator.stats().get(ValidationEvent::CacheHit), 1);
    }
}
