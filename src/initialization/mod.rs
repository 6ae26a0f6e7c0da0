//! Application initialization and resource setup.
//!
//! This module provides functions to initialize the shared resources a
//! validator needs:
//! - HTTP client for HEAD probes
//! - Process-wide probe concurrency limiter
//! - Cache backend (in-memory or SQLite)
//! - Logger
//!
//! All initialization functions return proper error types for error handling.

mod client;
mod limiter;
mod logger;

use std::sync::Arc;

use crate::cache::{CacheBackend, InMemoryCache, SqliteCache};
use crate::config::Config;
use crate::error_handling::InitializationError;

// Re-export public API
pub use client::{build_probe_client, init_probe_client};
pub use limiter::{init_probe_limiter, ProbeLimiter, ProbeSlot};
pub use logger::init_logger_with;

/// Initializes the cache backend selected by the configuration.
///
/// Uses the SQLite file at `config.cache_db` when set, otherwise a
/// process-local in-memory cache.
pub async fn init_cache_backend(
    config: &Config,
) -> Result<Arc<dyn CacheBackend>, InitializationError> {
    match &config.cache_db {
        Some(path) => {
            log::info!("Using SQLite link cache at {}", path.display());
            Ok(Arc::new(SqliteCache::open(path).await?))
        }
        None => {
            log::info!("Using in-memory link cache");
            Ok(Arc::new(InMemoryCache::new()))
        }
    }
}
