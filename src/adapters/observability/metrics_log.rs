//! Counter sink that emits structured log records.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use tracing::debug;

use crate::ports::Metrics;

/// Counts in process and logs each increment under the `metrics` target.
///
/// Totals survive for the lifetime of the process; a scrape endpoint or
/// push exporter can read them via [`TracingMetrics::get`].
#[derive(Default)]
pub struct TracingMetrics {
    counters: RwLock<HashMap<String, AtomicU64>>,
}

impl TracingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a counter, 0 if never incremented.
    pub fn get(&self, counter: &str) -> u64 {
        let counters = match self.counters.read() {
            Ok(counters) => counters,
            Err(poisoned) => poisoned.into_inner(),
        };
        counters
            .get(counter)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }
}

impl Metrics for TracingMetrics {
    fn increment(&self, counter: &str) {
        let total = {
            let counters = match self.counters.read() {
                Ok(counters) => counters,
                Err(poisoned) => poisoned.into_inner(),
            };
            match counters.get(counter) {
                Some(existing) => Some(existing.fetch_add(1, Ordering::Relaxed) + 1),
                None => None,
            }
        };

        let total = match total {
            Some(total) => total,
            None => {
                let mut counters = match self.counters.write() {
                    Ok(counters) => counters,
                    Err(poisoned) => poisoned.into_inner(),
                };
                counters
                    .entry(counter.to_string())
                    .or_insert_with(|| AtomicU64::new(0))
                    .fetch_add(1, Ordering::Relaxed)
                    + 1
            }
        };

        debug!(target: "metrics", counter, total, "counter incremented");
    }

    fn record_duration(&self, timer: &str, outcome: &str, elapsed: Duration) {
        debug!(
            target: "metrics",
            timer,
            outcome,
            elapsed_ms = elapsed.as_millis() as u64,
            "duration recorded"
        );
    }
}
