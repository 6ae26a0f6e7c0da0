//! Integration tests for run_validation
//!
//! These tests drive the file-based entry point with a SQLite cache and a
//! provider mapping file, the way the CLI does.

use std::io::Write;
use std::path::PathBuf;

use httptest::{matchers::*, responders::*, Expectation, Server};
use link_liveness::{run_validation, Config, LogFormat, LogLevel};
use tempfile::{NamedTempFile, TempDir};

/// Helper function to write result lines to a temporary file
fn write_lines_to_file(lines: &[String]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    for line in lines {
        writeln!(file, "{}", line).expect("Failed to write line");
    }
    file.flush().expect("Failed to flush file");
    file
}

fn result_line(id: &str, provider: &str, url: &str) -> String {
    serde_json::json!({ "identifier": id, "provider": provider, "url": url, "title": id })
        .to_string()
}

fn create_test_config(input_file: PathBuf, cache_db: PathBuf) -> Config {
    Config {
        file: input_file,
        query: "cats".to_string(),
        log_level: LogLevel::Error,
        log_format: LogFormat::Plain,
        probe_timeout_ms: 1000,
        acquire_timeout_ms: 1000,
        cache_db: Some(cache_db),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_run_validation_filters_file_and_reuses_sqlite_cache() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("HEAD", "/live.jpg"))
            .times(1)
            .respond_with(status_code(200)),
    );
    server.expect(
        Expectation::matching(request::method_path("HEAD", "/dead.jpg"))
            .times(1)
            .respond_with(status_code(404)),
    );

    let input = write_lines_to_file(&[
        result_line("live", "met", &server.url("/live.jpg").to_string()),
        String::new(),
        "not json".to_string(),
        result_line("dead", "met", &server.url("/dead.jpg").to_string()),
    ]);
    let dir = TempDir::new().expect("Failed to create temp directory");
    let config = create_test_config(input.path().to_path_buf(), dir.path().join("cache.db"));

    let report = run_validation(&config).await.expect("run succeeds");
    assert_eq!(report.total, 2, "Blank and malformed lines are skipped");
    assert_eq!(report.removed, 1);
    assert_eq!(report.survivors[0].identifier, "live");
    assert_eq!(report.survivors[0].extra["title"], "live");

    // A second run is served from the SQLite file; the server allows one probe per URL
    let again = run_validation(&config).await.expect("second run succeeds");
    assert_eq!(again.removed, 1);
    assert_eq!(again.query_hash, report.query_hash);
}

#[tokio::test]
async fn test_run_validation_unknown_provider_fails() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method("HEAD"))
            .times(0..)
            .respond_with(status_code(200)),
    );

    let input = write_lines_to_file(&[result_line(
        "x",
        "museum",
        &server.url("/x.jpg").to_string(),
    )]);
    let mappings = write_lines_to_file(&[r#"{"providers": {"flickr": {"live": [200]}}}"#.to_string()]);
    let dir = TempDir::new().expect("Failed to create temp directory");
    let mut config = create_test_config(input.path().to_path_buf(), dir.path().join("cache.db"));
    config.provider_mappings = Some(mappings.path().to_path_buf());

    let err = run_validation(&config).await.unwrap_err();
    assert!(
        format!("{err:#}").contains("museum"),
        "Error should name the provider: {err:#}"
    );
}

#[tokio::test]
async fn test_run_validation_missing_file() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let config = create_test_config(dir.path().join("absent.jsonl"), dir.path().join("cache.db"));

    let err = run_validation(&config).await.unwrap_err();
    assert!(format!("{err:#}").contains("Failed to open input file"));
}
