//! Bounded HEAD probing.
//!
//! [`Prober::probe`] issues one HEAD request per URL, all concurrently, each
//! holding a slot of the shared [`ProbeLimiter`] while in flight. Every URL
//! gets a status: the HTTP status code, or [`PROBE_FAILED`] when no slot was
//! free in time, the request timed out, or the connection failed.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use log::warn;
use reqwest::header::USER_AGENT;

use crate::config::PROBE_FAILED;
use crate::error_handling::{ValidationEvent, ValidationStats};
use crate::initialization::ProbeLimiter;
use crate::provider::LinkStatus;

/// Issues HEAD probes under a shared concurrency limit.
pub struct Prober {
    client: Arc<reqwest::Client>,
    limiter: Option<Arc<ProbeLimiter>>,
    request_timeout: Duration,
    user_agent: String,
    stats: Arc<ValidationStats>,
}

impl Prober {
    /// Creates a prober.
    ///
    /// `client` must not follow redirects (see
    /// [`crate::initialization::init_probe_client`]). `limiter` of `None`
    /// means unbounded concurrency.
    pub fn new(
        client: Arc<reqwest::Client>,
        limiter: Option<Arc<ProbeLimiter>>,
        request_timeout: Duration,
        user_agent: impl Into<String>,
        stats: Arc<ValidationStats>,
    ) -> Self {
        Self {
            client,
            limiter,
            request_timeout,
            user_agent: user_agent.into(),
            stats,
        }
    }

    /// Probes every URL, returning `(url, status)` pairs.
    ///
    /// Returns only after every probe has finished or failed. One URL's failure
    /// never affects its siblings.
    pub async fn probe(&self, urls: &[String]) -> Vec<(String, LinkStatus)> {
        join_all(urls.iter().map(|url| self.head(url))).await
    }

    async fn head(&self, url: &str) -> (String, LinkStatus) {
        // Held until the request completes
        let _slot = match &self.limiter {
            Some(limiter) => match limiter.acquire(url).await {
                Some(slot) => Some(slot),
                None => {
                    self.stats.increment(ValidationEvent::SlotTimeout);
                    warn!("image_validation_failed url={url} error=timed out waiting for a probe slot");
                    return (url.to_string(), PROBE_FAILED);
                }
            },
            None => None,
        };

        let result = self
            .client
            .head(url)
            .header(USER_AGENT, self.user_agent.as_str())
            .timeout(self.request_timeout)
            .send()
            .await;

        match result {
            Ok(response) => {
                self.stats.increment(ValidationEvent::ProbeCompleted);
                (url.to_string(), LinkStatus::from(response.status().as_u16()))
            }
            Err(e) => {
                self.stats.increment(ValidationEvent::ProbeFailed);
                log_validation_failure(url, &e);
                (url.to_string(), PROBE_FAILED)
            }
        }
    }
}

fn log_validation_failure(url: &str, error: &reqwest::Error) {
    let kind = if error.is_timeout() {
        "timeout"
    } else if error.is_connect() {
        "connect"
    } else if error.is_request() {
        "request"
    } else {
        "other"
    };
    warn!("image_validation_failed url={url} kind={kind} error={error}");
}
