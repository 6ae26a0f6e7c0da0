//! HTTP client initialization.
//!
//! This module provides the HTTP client used for HEAD probes.

use std::sync::Arc;
use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::Config;

/// Initializes the HTTP client for link probes.
///
/// Creates a `reqwest::Client` configured with:
/// - Redirects disabled (a redirect is recorded as the probe's status, its
///   target is never fetched)
/// - Total and connect timeouts from the probe timeout
/// - The link-validation User-Agent
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_probe_client(config: &Config) -> Result<Arc<reqwest::Client>, reqwest::Error> {
    build_probe_client(config.probe_timeout(), &config.user_agent())
}

/// Builds a probe client from explicit settings.
pub fn build_probe_client(
    timeout: Duration,
    user_agent: &str,
) -> Result<Arc<reqwest::Client>, reqwest::Error> {
    let client = ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(timeout)
        .connect_timeout(timeout)
        .user_agent(user_agent)
        .build()?;
    Ok(Arc::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;
    use httptest::{matchers::*, responders::*, Expectation, Server};

    #[tokio::test]
    async fn test_probe_client_does_not_follow_redirects() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("HEAD", "/moved"))
                .respond_with(status_code(301).append_header("Location", "/elsewhere")),
        );

        let client = init_probe_client(&Config::default()).expect("client builds");
        let response = client
            .head(server.url("/moved").to_string())
            .send()
            .await
            .expect("request succeeds");
        assert_eq!(response.status(), 301);
    }

    #[tokio::test]
    async fn test_probe_client_sends_user_agent() {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("HEAD", "/ua"),
                request::headers(contains(key("user-agent"))),
            ])
            .respond_with(status_code(200)),
        );

        let client = build_probe_client(Duration::from_secs(2), "TestAgent/1.0").unwrap();
        let response = client
            .head(server.url("/ua").to_string())
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }
}
