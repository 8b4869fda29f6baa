//! Lifecycle metrics
//!
//! Counters for cache effectiveness and for the defensive paths of the
//! lifecycle (collapsed setups, ignored releases). One set per context.

use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct StyleMetrics {
    /// Sheet lookups answered from the cache
    pub cache_hits: AtomicU64,

    /// Sheet lookups that had to compile
    pub cache_misses: AtomicU64,

    /// Compilations that failed and yielded no sheet
    pub compile_failures: AtomicU64,

    /// Sheets attached to the registry
    pub attaches: AtomicU64,

    /// Sheets detached from the registry
    pub detaches: AtomicU64,

    /// Setups absorbed because the instance already held an acquisition
    pub collapsed_setups: AtomicU64,

    /// Releases with no matching acquisition
    pub ignored_releases: AtomicU64,
}

impl StyleMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_compile_failure(&self) {
        self.compile_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_attach(&self) {
        self.attaches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_detach(&self) {
        self.detaches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_collapsed_setup(&self) {
        self.collapsed_setups.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ignored_release(&self) {
        self.ignored_releases.fetch_add(1, Ordering::Relaxed);
    }

    /// Cache hit rate (0.0 to 1.0)
    pub fn hit_rate(&self) -> f64 {
        let hits = self.cache_hits.load(Ordering::Relaxed) as f64;
        let total = hits + self.cache_misses.load(Ordering::Relaxed) as f64;

        if total == 0.0 {
            0.0
        } else {
            hits / total
        }
    }

    pub fn reset(&self) {
        self.cache_hits.store(0, Ordering::Relaxed);
        self.cache_misses.store(0, Ordering::Relaxed);
        self.compile_failures.store(0, Ordering::Relaxed);
        self.attaches.store(0, Ordering::Relaxed);
        self.detaches.store(0, Ordering::Relaxed);
        self.collapsed_setups.store(0, Ordering::Relaxed);
        self.ignored_releases.store(0, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            compile_failures: self.compile_failures.load(Ordering::Relaxed),
            attaches: self.attaches.load(Ordering::Relaxed),
            detaches: self.detaches.load(Ordering::Relaxed),
            collapsed_setups: self.collapsed_setups.load(Ordering::Relaxed),
            ignored_releases: self.ignored_releases.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`StyleMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub compile_failures: u64,
    pub attaches: u64,
    pub detaches: u64,
    pub collapsed_setups: u64,
    pub ignored_releases: u64,
}

impl fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hits={} misses={} failures={} attaches={} detaches={} collapsed={} ignored={}",
            self.cache_hits,
            self.cache_misses,
            self.compile_failures,
            self.attaches,
            self.detaches,
            self.collapsed_setups,
            self.ignored_releases
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_rate() {
        let metrics = StyleMetrics::new();
        assert_eq!(metrics.hit_rate(), 0.0);

        metrics.record_miss();
        metrics.record_hit();
        metrics.record_hit();
        metrics.record_hit();
        assert_eq!(metrics.hit_rate(), 0.75);
    }

    #[test]
    fn snapshot_and_reset() {
        let metrics = StyleMetrics::new();
        metrics.record_attach();
        metrics.record_detach();
        metrics.record_ignored_release();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.attaches, 1);
        assert_eq!(snapshot.ignored_releases, 1);
        assert!(snapshot.to_string().contains("attaches=1"));

        metrics.reset();
        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
    }
}
