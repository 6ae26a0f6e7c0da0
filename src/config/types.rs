//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    DEFAULT_ACQUIRE_TIMEOUT_MS, DEFAULT_MAX_CONCURRENT_REQUESTS, DEFAULT_PROBE_TIMEOUT_MS,
    DEFAULT_USER_AGENT_TEMPLATE, USER_AGENT_PURPOSE,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Engine and CLI configuration.
///
/// Parsed by `clap` for the binary (every option also reads an environment
/// variable), and constructible programmatically via `Default` for library use.
///
/// # Examples
///
/// ```no_run
/// use link_liveness::Config;
///
/// let config = Config {
///     max_concurrent_requests: 25,
///     probe_timeout_ms: 1500,
///     ..Default::default()
/// };
/// assert!(config.user_agent().contains("LinkValidation"));
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "link_liveness",
    about = "Filters dead media links out of search results using cached HEAD probes."
)]
pub struct Config {
    /// JSON-lines file of search results (`identifier`, `provider`, `url`)
    #[arg(value_parser, default_value = "results.jsonl")]
    pub file: PathBuf,

    /// Query string the results belong to (hashed into the mask key)
    #[arg(long, env = "LINK_VALIDATION_QUERY", default_value = "")]
    pub query: String,

    /// Absolute position of the first result in the query's full ordering
    #[arg(long, default_value_t = 0)]
    pub offset: usize,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Maximum in-flight HEAD probes across all validations (0 = unbounded)
    #[arg(
        long,
        env = "LINK_VALIDATION_MAX_CONCURRENT_REQUESTS",
        default_value_t = DEFAULT_MAX_CONCURRENT_REQUESTS
    )]
    pub max_concurrent_requests: usize,

    /// Total timeout of a single HEAD probe in milliseconds
    #[arg(long, env = "LINK_VALIDATION_PROBE_TIMEOUT_MS", default_value_t = DEFAULT_PROBE_TIMEOUT_MS)]
    pub probe_timeout_ms: u64,

    /// Maximum wait for a probe slot in milliseconds
    #[arg(long, env = "LINK_VALIDATION_ACQUIRE_TIMEOUT_MS", default_value_t = DEFAULT_ACQUIRE_TIMEOUT_MS)]
    pub acquire_timeout_ms: u64,

    /// Outbound User-Agent template (`{purpose}` and `{version}` are substituted)
    #[arg(long, env = "OUTBOUND_USER_AGENT_TEMPLATE", default_value = DEFAULT_USER_AGENT_TEMPLATE)]
    pub user_agent_template: String,

    /// SQLite file used as the shared status/mask cache (in-memory if omitted)
    #[arg(long, env = "LINK_VALIDATION_CACHE_DB")]
    pub cache_db: Option<PathBuf>,

    /// JSON file with provider status mappings (built-in table if omitted)
    #[arg(long, env = "LINK_VALIDATION_PROVIDER_MAPPINGS")]
    pub provider_mappings: Option<PathBuf>,
}

impl Config {
    /// Renders the outbound User-Agent for link validation probes.
    pub fn user_agent(&self) -> String {
        self.user_agent_template
            .replace("{purpose}", USER_AGENT_PURPOSE)
            .replace("{version}", env!("CARGO_PKG_VERSION"))
    }

    /// Per-probe request timeout.
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Probe slot acquisition timeout.
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file: PathBuf::from("results.jsonl"),
            query: String::new(),
            offset: 0,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
            acquire_timeout_ms: DEFAULT_ACQUIRE_TIMEOUT_MS,
            user_agent_template: DEFAULT_USER_AGENT_TEMPLATE.to_string(),
            cache_db: None,
            provider_mappings: None,
        }
    }
}
