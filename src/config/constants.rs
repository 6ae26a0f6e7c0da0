//! Configuration constants.
//!
//! This module defines the constants used throughout the engine, including
//! cache key conventions, probe timeouts, and cache expiry defaults.

use std::time::Duration;

/// Status value recorded when a probe produced no usable HTTP response
/// (timeout, connection error, DNS failure, slot-acquire timeout).
pub const PROBE_FAILED: i32 = -1;

// Cache key conventions
/// Namespace prefix for per-URL liveness entries (`valid:<url>`)
pub const STATUS_CACHE_PREFIX: &str = "valid:";
/// Suffix for per-query liveness masks (`<query_hash>:dead_link_mask`)
pub const MASK_KEY_SUFFIX: &str = ":dead_link_mask";
/// Lifetime of a stored query mask (2 hours)
/// Long enough to cover a user paging through one query's results.
pub const MASK_TTL: Duration = Duration::from_secs(2 * 60 * 60);

// Probe limits
/// Default maximum number of in-flight HEAD probes (0 disables the limit)
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 10;
/// Total timeout for a single HEAD probe in milliseconds
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 2000;
/// Maximum wait for a probe slot in milliseconds
/// A probe that cannot get a slot in time fails with the sentinel status
/// instead of queueing behind other requests' probes.
pub const DEFAULT_ACQUIRE_TIMEOUT_MS: u64 = 2000;

// Outbound identification
/// Purpose string substituted into the user-agent template
pub const USER_AGENT_PURPOSE: &str = "LinkValidation";
/// Default outbound User-Agent template.
///
/// `{purpose}` is replaced with [`USER_AGENT_PURPOSE`] and `{version}` with
/// the crate version, so origin operators can tell what the request is for.
pub const DEFAULT_USER_AGENT_TEMPLATE: &str =
    "LinkLiveness{purpose}/{version}";

// Cache expiry (seconds)
/// Environment variable prefix for per-status expiry overrides
/// (`LINK_VALIDATION_CACHE_EXPIRY__200=86400`, `LINK_VALIDATION_CACHE_EXPIRY__-1=60`)
pub const CACHE_EXPIRY_ENV_PREFIX: &str = "LINK_VALIDATION_CACHE_EXPIRY__";
/// Key used after the prefix to override the fallback expiry
pub const CACHE_EXPIRY_DEFAULT_KEY: &str = "DEFAULT";
/// Expiry for live (200) responses: 30 days
pub const CACHE_EXPIRY_OK_SECS: u64 = 30 * 24 * 60 * 60;
/// Expiry for failed probes: 1 hour
/// A failing origin is assumed to stay down for a while, but not for long.
pub const CACHE_EXPIRY_FAILED_SECS: u64 = 60 * 60;
/// Expiry for every other status: 120 days
pub const CACHE_EXPIRY_DEFAULT_SECS: u64 = 120 * 24 * 60 * 60;

// HTTP status codes
/// HTTP 200 OK
pub const HTTP_STATUS_OK: i32 = 200;
/// HTTP 403 Forbidden
pub const HTTP_STATUS_FORBIDDEN: i32 = 403;
/// HTTP 429 Too Many Requests
pub const HTTP_STATUS_TOO_MANY_REQUESTS: i32 = 429;
/// HTTP 500 Internal Server Error
pub const HTTP_STATUS_INTERNAL_SERVER_ERROR: i32 = 500;
