//! Error type definitions.
//!
//! This module defines the error types and the event taxonomy used throughout
//! the engine.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// Error opening or preparing the cache backend.
    #[error("Cache initialization error: {0}")]
    CacheError(#[from] CacheError),

    /// Error loading the provider status mapping table.
    #[error("Provider mapping error: {0}")]
    ProviderMappingError(String),

    /// Error starting the runtime behind a blocking validator.
    #[error("Runtime initialization error: {0}")]
    RuntimeError(#[from] std::io::Error),
}

/// Error types for cache backend operations.
///
/// These never reach the caller of a validation; the status cache and mask
/// store log them and degrade.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The backend could not be reached.
    #[error("Cache backend unavailable: {0}")]
    Unavailable(String),

    /// Error creating the cache database file.
    #[error("Cache file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),
}

/// Errors returned by a validation call.
///
/// Both variants indicate a caller or deployment defect rather than a runtime
/// condition; network and cache failures are never reported here.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// No status mapping exists for the provider and no default is configured.
    #[error("No status mapping configured for provider '{0}'")]
    UnknownProvider(String),

    /// `results` and `urls` must be parallel slices.
    #[error("Got {results} results but {urls} URLs")]
    LengthMismatch {
        /// Number of result entries
        results: usize,
        /// Number of URLs
        urls: usize,
    },
}

/// Events counted while validating links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ValidationEvent {
    /// A URL's status was served from the cache
    CacheHit,
    /// A URL had no cached status and was probed
    CacheMiss,
    /// The cache backend failed a read or write
    CacheUnavailable,
    /// A HEAD probe returned an HTTP status
    ProbeCompleted,
    /// A HEAD probe failed with a network error or timeout
    ProbeFailed,
    /// A probe could not acquire a concurrency slot in time
    SlotTimeout,
    /// A dead entry was removed from the results
    DeadRemoved,
    /// An ambiguous (rate-limited/blocked) entry was kept
    UnknownKept,
}
