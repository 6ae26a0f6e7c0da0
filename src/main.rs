//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `link_liveness` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - Writing surviving results to stdout
//!
//! All core functionality is implemented in the library crate.

use std::io::Write;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use link_liveness::initialization::init_logger_with;
use link_liveness::{run_validation, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Cache expiry overrides may live in .env
    let _ = dotenvy::dotenv();

    let config = Config::parse();

    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    match run_validation(&config).await {
        Ok(report) => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            for result in &report.survivors {
                serde_json::to_writer(&mut out, result).context("Failed to write result")?;
                writeln!(out).context("Failed to write result")?;
            }
            log::info!(
                "Kept {} of {} result{} ({} dead removed) in {:.1}s",
                report.survivors.len(),
                report.total,
                if report.total == 1 { "" } else { "s" },
                report.removed,
                report.elapsed_seconds
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("link_liveness error: {:#}", e);
            process::exit(1);
        }
    }
}
