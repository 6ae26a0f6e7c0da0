//! Probe concurrency limiter initialization.
//!
//! This module provides a counting limiter for outbound HEAD probes. One
//! limiter is shared by every validation in the process, so concurrent search
//! requests compete for the same pool of probe slots.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore as TokioSemaphore;

/// Counting limiter bounding in-flight HEAD probes.
///
/// # Behavior
///
/// - At most `capacity` slots are held at once
/// - Waiting for a slot is bounded by `acquire_timeout`; a caller that times
///   out gets no slot instead of queueing indefinitely
/// - Releasing a slot never raises the available count above `capacity`
pub struct ProbeLimiter {
    permits: Arc<TokioSemaphore>,
    capacity: usize,
    acquire_timeout: Duration,
}

impl ProbeLimiter {
    /// Waits up to the acquire timeout for a slot.
    ///
    /// Returns `None` if no slot became free in time.
    pub async fn acquire(&self, url: &str) -> Option<ProbeSlot<'_>> {
        self.log_event("request_concurrent_head_request", url);
        match tokio::time::timeout(self.acquire_timeout, self.permits.acquire()).await {
            Ok(Ok(permit)) => {
                // Released manually by ProbeSlot so the capacity cap is enforced
                permit.forget();
                self.log_event("acquired_concurrent_head_request", url);
                Some(ProbeSlot {
                    limiter: self,
                    url: url.to_string(),
                })
            }
            Ok(Err(_closed)) => {
                log::warn!("Probe limiter closed while waiting url={url}");
                None
            }
            Err(_elapsed) => {
                self.log_event("timeout_acquire_concurrent_head_request", url);
                None
            }
        }
    }

    /// Number of currently free slots.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Configured maximum number of slots.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn release(&self, url: &str) {
        if self.permits.available_permits() < self.capacity {
            self.permits.add_permits(1);
            self.log_event("released_concurrent_head_request", url);
        }
    }

    fn log_event(&self, event: &str, url: &str) {
        let count = self.permits.available_permits();
        log::debug!(
            "{event} locked={} url={url} count={count} capacity={}",
            count == 0,
            self.capacity
        );
    }
}

/// A held probe slot, returned to the limiter on drop.
pub struct ProbeSlot<'a> {
    limiter: &'a ProbeLimiter,
    url: String,
}

impl Drop for ProbeSlot<'_> {
    fn drop(&mut self) {
        self.limiter.release(&self.url);
    }
}

/// Initializes the probe limiter.
///
/// If `max_concurrent` is 0, probing is unbounded and `None` is returned.
///
/// # Arguments
///
/// * `max_concurrent` - Maximum in-flight probes (0 disables the limit)
/// * `acquire_timeout` - Maximum wait for a free slot
pub fn init_probe_limiter(
    max_concurrent: usize,
    acquire_timeout: Duration,
) -> Option<Arc<ProbeLimiter>> {
    if max_concurrent == 0 {
        return None;
    }
    Some(Arc::new(ProbeLimiter {
        permits: Arc::new(TokioSemaphore::new(max_concurrent)),
        capacity: max_concurrent,
        acquire_timeout,
    }))
}
