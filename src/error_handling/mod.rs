//! Error handling and validation statistics.
//!
//! This module provides:
//! - Error type definitions (initialization, cache backend, validation)
//! - The validation event taxonomy
//! - Thread-safe event counters
//!
//! Only configuration defects surface as errors from a validation. Cache and
//! network failures are recovered locally and show up as counted events.

mod stats;
mod types;

// Re-export public API
pub use stats::ValidationStats;
pub use types::{CacheError, InitializationError, ValidationError, ValidationEvent};
