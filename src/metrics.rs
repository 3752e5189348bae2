//! Chain counters for observability.
//!
//! Each service instance owns its own `ChainMetrics`; nothing here is global.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct ChainMetrics {
    chains_started: AtomicUsize,
    chains_completed: AtomicUsize,
    chains_failed: AtomicUsize,
    /// Successful provider calls across all completed chains
    hops_completed: AtomicUsize,
    /// Chains that failed because a provider call failed or timed out
    provider_failures: AtomicUsize,
}

impl ChainMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_started(&self) {
        self.chains_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_completed(&self, hops: usize) {
        self.chains_completed.fetch_add(1, Ordering::Relaxed);
        self.hops_completed.fetch_add(hops, Ordering::Relaxed);
    }

    pub fn record_failed(&self, provider_failure: bool) {
        self.chains_failed.fetch_add(1, Ordering::Relaxed);
        if provider_failure {
            self.provider_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn report(&self) -> MetricsReport {
        let started = self.chains_started.load(Ordering::Relaxed);
        let completed = self.chains_completed.load(Ordering::Relaxed);
        let failed = self.chains_failed.load(Ordering::Relaxed);

        let finished = completed + failed;
        let success_rate = if finished > 0 {
            (completed as f64 / finished as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            chains_started: started,
            chains_completed: completed,
            chains_failed: failed,
            hops_completed: self.hops_completed.load(Ordering::Relaxed),
            provider_failures: self.provider_failures.load(Ordering::Relaxed),
            success_rate,
        }
    }
}

/// Point-in-time copy of [`ChainMetrics`].
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub chains_started: usize,
    pub chains_completed: usize,
    pub chains_failed: usize,
    pub hops_completed: usize,
    pub provider_failures: usize,
    /// Completed chains as a percentage (0-100) of finished ones
    pub success_rate: f64,
}
