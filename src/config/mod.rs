//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (cache keys, timeouts, expiry defaults)
//! - The per-status cache expiry table
//! - CLI option types and parsing

mod constants;
mod expiry;
mod types;

// Re-export all constants
pub use constants::*;
pub use expiry::CacheExpiry;
pub use types::{Config, LogFormat, LogLevel};
