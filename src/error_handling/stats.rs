//! Validation statistics tracking.
//!
//! This module provides thread-safe counters for cache, probe, and filtering
//! events, shared by every validation that runs through one validator.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::ValidationEvent;

/// Thread-safe validation statistics tracker.
///
/// Every [`ValidationEvent`] is initialized to zero on creation, so the map is
/// never mutated after construction and the struct can be shared via `Arc`.
pub struct ValidationStats {
    events: HashMap<ValidationEvent, AtomicUsize>,
}

impl ValidationStats {
    /// Creates a tracker with every counter at zero.
    pub fn new() -> Self {
        let mut events = HashMap::new();
        for event in ValidationEvent::iter() {
            events.insert(event, AtomicUsize::new(0));
        }
        ValidationStats { events }
    }

    /// Increment an event counter by one.
    pub fn increment(&self, event: ValidationEvent) {
        self.add(event, 1);
    }

    /// Increment an event counter by `count`.
    pub fn add(&self, event: ValidationEvent, count: usize) {
        if let Some(counter) = self.events.get(&event) {
            counter.fetch_add(count, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment counter for {:?} which is not in the map. \
                 This indicates a bug in ValidationStats initialization.",
                event
            );
        }
    }

    /// Get the count for an event.
    pub fn get(&self, event: ValidationEvent) -> usize {
        self.events
            .get(&event)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Snapshot of every non-zero counter, in declaration order.
    pub fn snapshot(&self) -> Vec<(ValidationEvent, usize)> {
        ValidationEvent::iter()
            .map(|event| (event, self.get(event)))
            .filter(|(_, count)| *count > 0)
            .collect()
    }

    /// Logs the current counters at info level.
    pub fn log_summary(&self) {
        let snapshot = self.snapshot();
        if snapshot.is_empty() {
            log::info!("No link validation activity recorded");
            return;
        }
        for (event, count) in snapshot {
            log::info!("{:?}: {}", event, count);
        }
    }
}

impl Default for ValidationStats {
    fn default() -> Self {
        Self::new()
    }
}
