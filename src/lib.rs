//! link_liveness library: dead-link filtering for media search results
//!
//! This library removes search results whose image URL is no longer reachable.
//! Link statuses are cached with per-status expiry, uncached links are checked
//! with HEAD probes under a process-wide concurrency limit, and the liveness of
//! every result seen for a query is kept as a mask for later pages.
//!
//! # Example
//!
//! ```no_run
//! use link_liveness::{query_hash, Config, LinkValidator, SearchResult};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let validator = LinkValidator::from_config(&Config::default()).await?;
//!
//! let results = vec![
//!     SearchResult::new("a1", "flickr", "https://example.org/a1.jpg"),
//!     SearchResult::new("b2", "met", "https://example.org/b2.jpg"),
//! ];
//! let urls: Vec<String> = results.iter().map(|r| r.url.clone()).collect();
//! let hash = query_hash(&serde_json::json!({ "q": "cats" }))?;
//!
//! let survivors = validator.validate(&hash, 0, results, &urls).await?;
//! println!("{} results survived", survivors.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! [`LinkValidator`] requires a Tokio runtime. Synchronous callers use
//! [`BlockingLinkValidator`], which owns one.

#![warn(missing_docs)]

pub mod cache;
pub mod config;
pub mod error_handling;
pub mod initialization;
pub mod mask;
pub mod probe;
pub mod provider;
mod validate;

// Re-export public API
pub use config::{CacheExpiry, Config, LogFormat, LogLevel};
pub use error_handling::{InitializationError, ValidationError, ValidationEvent, ValidationStats};
pub use mask::{query_hash, MaskStore, QueryMask};
pub use provider::{LinkStatus, Liveness, ProviderStatusMappings, StatusMapping};
pub use run::{run_validation, ValidationReport};
pub use validate::{BlockingLinkValidator, LinkValidator, SearchResult, SearchResultEntry};

// Internal run module (reads a results file and validates it as one page)
mod run {
    use anyhow::{Context, Result};
    use log::{info, warn};
    use serde_json::json;
    use tokio::io::{AsyncBufReadExt, BufReader};

    use crate::config::Config;
    use crate::mask::query_hash;
    use crate::validate::{LinkValidator, SearchResult};

    /// Results of validating one page of search results.
    #[derive(Debug, Clone)]
    pub struct ValidationReport {
        /// Results whose links are live or ambiguous, in input order
        pub survivors: Vec<SearchResult>,
        /// Number of results read from the input
        pub total: usize,
        /// Number of dead results removed
        pub removed: usize,
        /// Mask key hash of the query
        pub query_hash: String,
        /// Elapsed time in seconds
        pub elapsed_seconds: f64,
    }

    /// Validates the JSON-lines results file named by `config.file`.
    ///
    /// Each non-empty line is one [`SearchResult`]; lines that do not parse are
    /// skipped with a warning. `-` reads from stdin.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read, the validator cannot be
    /// initialized, or a result names a provider with no status mapping.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use link_liveness::{run_validation, Config};
    /// use std::path::PathBuf;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = Config {
    ///     file: PathBuf::from("page.jsonl"),
    ///     query: "cats".to_string(),
    ///     ..Default::default()
    /// };
    /// let report = run_validation(&config).await?;
    /// println!("Removed {} dead results", report.removed);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run_validation(config: &Config) -> Result<ValidationReport> {
        let start_time = std::time::Instant::now();
        let results = read_results(config).await?;
        let total = results.len();
        info!("Read {} search results", total);

        let validator = LinkValidator::from_config(config)
            .await
            .context("Failed to initialize link validator")?;
        let hash = query_hash(&json!({ "q": config.query }))
            .context("Failed to hash query")?;

        let urls: Vec<String> = results.iter().map(|r| r.url.clone()).collect();
        let survivors = validator
            .validate(&hash, config.offset, results, &urls)
            .await
            .context("Link validation failed")?;

        validator.stats().log_summary();

        Ok(ValidationReport {
            removed: total - survivors.len(),
            survivors,
            total,
            query_hash: hash,
            elapsed_seconds: start_time.elapsed().as_secs_f64(),
        })
    }

    async fn read_results(config: &Config) -> Result<Vec<SearchResult>> {
        let mut lines = if config.file.as_os_str() == "-" {
            info!("Reading search results from stdin");
            let reader: Box<dyn tokio::io::AsyncRead + Unpin + Send> = Box::new(tokio::io::stdin());
            BufReader::new(reader).lines()
        } else {
            let file = tokio::fs::File::open(&config.file)
                .await
                .with_context(|| format!("Failed to open input file {}", config.file.display()))?;
            let reader: Box<dyn tokio::io::AsyncRead + Unpin + Send> = Box::new(file);
            BufReader::new(reader).lines()
        };

        let mut results = Vec::new();
        let mut line_no = 0usize;
        while let Some(line) = lines
            .next_line()
            .await
            .context("Failed to read line from input")?
        {
            line_no += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<SearchResult>(trimmed) {
                Ok(result) => results.push(result),
                Err(e) => warn!("Skipping malformed result on line {line_no}: {e}"),
            }
        }
        Ok(results)
    }
}
