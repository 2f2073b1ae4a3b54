//! Non-fatal anomaly counters for numerical degeneracy and other runtime
//! anomalies. Shared read-write across worker threads without locking,
//! since each counter is an independent atomic.
#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};

/// A single named counter, incremented from any worker thread.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn incr(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Aggregate anomaly counters for a single driver run.
#[derive(Debug, Default)]
pub struct Diagnostics {
    /// Degenerate triangles encountered during scene construction or
    /// intersection (zero area, singular solve).
    pub degenerate_triangles: Counter,
    /// Directions that underflowed to zero length after perturbation.
    pub zero_length_dirs: Counter,
    /// Scatter samples that exhausted their resample budget and fell back
    /// to the nominal direction.
    pub resample_exhausted: Counter,
}

impl Diagnostics {
    pub fn total(&self) -> u64 {
        self.degenerate_triangles.get() + self.zero_length_dirs.get() + self.resample_exhausted.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let diag = Diagnostics::default();
        diag.degenerate_triangles.incr();
        diag.degenerate_triangles.incr();
        diag.zero_length_dirs.incr();
        assert_eq!(diag.degenerate_triangles.get(), 2);
        assert_eq!(diag.zero_length_dirs.get(), 1);
        assert_eq!(diag.total(), 3);
    }
}
