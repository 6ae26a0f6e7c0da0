// Shared test helpers for validator setup and test data creation.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use httptest::{matchers::*, responders::*, Expectation, Server};

use link_liveness::cache::{CacheBackend, CacheWrite, InMemoryCache};
use link_liveness::error_handling::CacheError;
use link_liveness::{
    CacheExpiry, Config, LinkValidator, LogFormat, LogLevel, ProviderStatusMappings, SearchResult,
};

/// A cache backend whose every call fails, standing in for an unreachable cache.
#[allow(dead_code)] // Used by other test files
pub struct UnreachableCache;

#[async_trait]
impl CacheBackend for UnreachableCache {
    async fn get_many(&self, _keys: &[String]) -> Result<Vec<Option<String>>, CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn set_many(&self, _writes: &[CacheWrite]) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }
}

/// In-memory backend that counts reads and records every write.
#[allow(dead_code)] // Used by other test files
#[derive(Default)]
pub struct RecordingCache {
    inner: InMemoryCache,
    reads: AtomicUsize,
    writes: Mutex<Vec<CacheWrite>>,
}

#[allow(dead_code)] // Used by other test files
impl RecordingCache {
    /// Number of `get_many` calls seen.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Every write seen, in order.
    pub fn writes(&self) -> Vec<CacheWrite> {
        self.writes.lock().expect("writes lock poisoned").clone()
    }

    /// The last write for `key`, if any.
    pub fn last_write(&self, key: &str) -> Option<CacheWrite> {
        self.writes().into_iter().rev().find(|w| w.key == key)
    }
}

#[async_trait]
impl CacheBackend for RecordingCache {
    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>, CacheError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get_many(keys).await
    }

    async fn set_many(&self, writes: &[CacheWrite]) -> Result<(), CacheError> {
        self.writes
            .lock()
            .expect("writes lock poisoned")
            .extend_from_slice(writes);
        self.inner.set_many(writes).await
    }
}

/// Creates a Config with short timeouts for testing.
pub fn create_test_config() -> Config {
    Config {
        log_level: LogLevel::Error, // Reduce noise in tests
        log_format: LogFormat::Plain,
        probe_timeout_ms: 1000,
        acquire_timeout_ms: 1000,
        user_agent_template: "link_liveness_test/{version}".to_string(),
        ..Default::default()
    }
}

/// Creates a validator over `backend` using the built-in provider table.
pub fn create_validator(backend: Arc<dyn CacheBackend>) -> LinkValidator {
    LinkValidator::new(
        &create_test_config(),
        backend,
        ProviderStatusMappings::builtin(),
        CacheExpiry::default(),
    )
    .expect("Failed to build validator")
}

/// Creates a validator whose probes give up after `probe_timeout_ms`.
#[allow(dead_code)] // Used by other test files
pub fn create_validator_with_timeout(
    backend: Arc<dyn CacheBackend>,
    probe_timeout_ms: u64,
    expiry: CacheExpiry,
) -> LinkValidator {
    let config = Config {
        probe_timeout_ms,
        ..create_test_config()
    };
    LinkValidator::new(&config, backend, ProviderStatusMappings::builtin(), expiry)
        .expect("Failed to build validator")
}

/// Expects exactly one HEAD request for `path`, answered with `status`.
pub fn expect_head(server: &Server, path: &'static str, status: u16) {
    server.expect(
        Expectation::matching(request::method_path("HEAD", path))
            .times(1)
            .respond_with(status_code(status)),
    );
}

/// Builds results for `(identifier, path)` pairs served by `server`.
pub fn results_for(server: &Server, provider: &str, entries: &[(&str, &str)]) -> Vec<SearchResult> {
    entries
        .iter()
        .map(|(id, path)| SearchResult::new(*id, provider, server.url(path).to_string()))
        .collect()
}

/// The parallel URL list for `results`.
pub fn urls_of(results: &[SearchResult]) -> Vec<String> {
    results.iter().map(|r| r.url.clone()).collect()
}

/// Identifiers of `results`, in order.
#[allow(dead_code)] // Used by other test files
pub fn ids(results: &[SearchResult]) -> Vec<&str> {
    results.iter().map(|r| r.identifier.as_str()).collect()
}
