//! Validation with an unreachable cache.
//!
//! Every URL is probed and the page is still filtered; nothing surfaces as an
//! error.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use httptest::{matchers::*, responders::*, Expectation, Server};

use helpers::{
    create_validator, create_validator_with_timeout, expect_head, ids, results_for, urls_of,
    UnreachableCache,
};
use link_liveness::{CacheExpiry, SearchResult, ValidationEvent};

#[tokio::test]
async fn test_cache_down_probes_everything() {
    let server = Server::run();
    expect_head(&server, "/a.jpg", 200);
    expect_head(&server, "/b.jpg", 200);
    server.expect(
        Expectation::matching(request::method_path("HEAD", "/c.jpg"))
            .times(1)
            .respond_with(delay_and_then(Duration::from_millis(800), status_code(200))),
    );

    let validator =
        create_validator_with_timeout(Arc::new(UnreachableCache), 200, CacheExpiry::default());
    let results = results_for(
        &server,
        "met",
        &[("A", "/a.jpg"), ("B", "/b.jpg"), ("C", "/c.jpg")],
    );
    let urls = urls_of(&results);

    let survivors = validator
        .validate("outage", 0, results, &urls)
        .await
        .expect("cache outage never fails validation");

    assert_eq!(ids(&survivors), vec!["A", "B"]);
    let stats = validator.stats();
    assert_eq!(stats.get(ValidationEvent::CacheMiss), 3);
    assert_eq!(stats.get(ValidationEvent::ProbeFailed), 1);
    assert_eq!(stats.get(ValidationEvent::DeadRemoved), 1);
    // Status read, status write, mask read, mask write
    assert_eq!(stats.get(ValidationEvent::CacheUnavailable), 4);
}

#[tokio::test]
async fn test_cache_down_with_refused_connection() {
    let server = Server::run();
    expect_head(&server, "/a.jpg", 200);

    let validator = create_validator(Arc::new(UnreachableCache));
    let mut results = results_for(&server, "met", &[("A", "/a.jpg")]);
    let mut urls = urls_of(&results);

    // Port 1 on loopback refuses connections
    results.push(SearchResult::new("R", "met", "http://127.0.0.1:1/r.jpg"));
    urls.push("http://127.0.0.1:1/r.jpg".to_string());

    let survivors = validator
        .validate("refused", 0, results, &urls)
        .await
        .expect("cache outage never fails validation");

    assert_eq!(ids(&survivors), vec!["A"]);
    assert_eq!(validator.stats().get(ValidationEvent::ProbeFailed), 1);
}
