//! Per-status cache expiry table.

use std::collections::HashMap;
use std::time::Duration;

use super::constants::{
    CACHE_EXPIRY_DEFAULT_KEY, CACHE_EXPIRY_DEFAULT_SECS, CACHE_EXPIRY_ENV_PREFIX,
    CACHE_EXPIRY_FAILED_SECS, CACHE_EXPIRY_OK_SECS, HTTP_STATUS_OK, PROBE_FAILED,
};

/// Maps a liveness status (including the `-1` sentinel) to a cache TTL.
///
/// Statuses without an explicit entry use the default expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheExpiry {
    by_status: HashMap<i32, Duration>,
    default: Duration,
}

impl CacheExpiry {
    /// Creates an empty table where every status uses `default`.
    pub fn new(default: Duration) -> Self {
        Self {
            by_status: HashMap::new(),
            default,
        }
    }

    /// Sets the expiry for a single status.
    pub fn with_status(mut self, status: i32, ttl: Duration) -> Self {
        self.by_status.insert(status, ttl);
        self
    }

    /// Returns the TTL to use for `status`.
    pub fn expiry_for(&self, status: i32) -> Duration {
        self.by_status.get(&status).copied().unwrap_or(self.default)
    }

    /// Builds the table from the built-in defaults plus environment overrides.
    ///
    /// Reads `LINK_VALIDATION_CACHE_EXPIRY__<status>` (seconds) for any status,
    /// including `-1`, and `LINK_VALIDATION_CACHE_EXPIRY__DEFAULT` for the
    /// fallback. Malformed values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Applies overrides from an iterator of `(name, value)` pairs.
    pub fn from_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut expiry = Self::default();
        for (name, value) in vars {
            let Some(key) = name.strip_prefix(CACHE_EXPIRY_ENV_PREFIX) else {
                continue;
            };
            let secs = match value.trim().parse::<u64>() {
                Ok(secs) => secs,
                Err(e) => {
                    log::warn!("Ignoring {name}={value:?}: not a number of seconds ({e})");
                    continue;
                }
            };
            let ttl = Duration::from_secs(secs);
            if key == CACHE_EXPIRY_DEFAULT_KEY {
                expiry.default = ttl;
            } else {
                match key.parse::<i32>() {
                    Ok(status) => {
                        expiry.by_status.insert(status, ttl);
                    }
                    Err(_) => log::warn!("Ignoring {name}: {key:?} is not a status code"),
                }
            }
        }
        expiry
    }
}

impl Default for CacheExpiry {
    fn default() -> Self {
        Self::new(Duration::from_secs(CACHE_EXPIRY_DEFAULT_SECS))
            .with_status(HTTP_STATUS_OK, Duration::from_secs(CACHE_EXPIRY_OK_SECS))
            .with_status(PROBE_FAILED, Duration::from_secs(CACHE_EXPIRY_FAILED_SECS))
    }
}
