//! Cache statistics and metrics tracking
//!
//! This module provides types for tracking cache performance metrics
//! including hit rates and removal counts broken down by cause.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::listener::RemovalCause;

/// Statistics for cache performance monitoring
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Current number of mapped entries
    pub size: usize,

    /// Soft-mode memory watermark (None for other modes)
    pub watermark: Option<usize>,

    /// Total number of successful get operations
    pub hits: u64,

    /// Total number of failed get operations (key not found or expired)
    pub misses: u64,

    /// Total number of installed entries (puts and computed values)
    pub inserts: u64,

    /// Entries removed explicitly by callers (including `clear`)
    pub explicit_removals: u64,

    /// Entries overwritten by a later put or recomputation
    pub replacements: u64,

    /// Entries removed because their TTL elapsed
    pub expirations: u64,

    /// Entries reclaimed by the sweep and drained from the queue
    pub collected: u64,
}

impl CacheStats {
    /// Calculate hit rate (hits / total accesses)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Calculate miss rate (misses / total accesses)
    pub fn miss_rate(&self) -> f64 {
        1.0 - self.hit_rate()
    }

    /// Calculate fill percentage against the watermark
    pub fn fill_percentage(&self) -> Option<f64> {
        self.watermark.map(|max| if max == 0 { 0.0 } else { self.size as f64 / max as f64 })
    }

    /// Total number of access operations (hits + misses)
    pub fn total_accesses(&self) -> u64 {
        self.hits + self.misses
    }

    /// Total number of removed entries across all causes
    pub fn total_removals(&self) -> u64 {
        self.explicit_removals + self.replacements + self.expirations + self.collected
    }
}

/// Thread-safe metrics collector for cache operations
///
/// This struct uses atomic operations to track cache metrics
/// without requiring locks, enabling low-overhead monitoring.
#[derive(Debug)]
pub(crate) struct MetricsCollector {
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
    inserts: Arc<AtomicU64>,
    explicit_removals: Arc<AtomicU64>,
    replacements: Arc<AtomicU64>,
    expirations: Arc<AtomicU64>,
    collected: Arc<AtomicU64>,
}

impl Clone for MetricsCollector {
    fn clone(&self) -> Self {
        Self {
            hits: Arc::clone(&self.hits),
            misses: Arc::clone(&self.misses),
            inserts: Arc::clone(&self.inserts),
            explicit_removals: Arc::clone(&self.explicit_removals),
            replacements: Arc::clone(&self.replacements),
            expirations: Arc::clone(&self.expirations),
            collected: Arc::clone(&self.collected),
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCollector {
    /// Create a new metrics collector
    pub(crate) fn new() -> Self {
        Self {
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
            inserts: Arc::new(AtomicU64::new(0)),
            explicit_removals: Arc::new(AtomicU64::new(0)),
            replacements: Arc::new(AtomicU64::new(0)),
            expirations: Arc::new(AtomicU64::new(0)),
            collected: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Record a cache hit
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a cache miss
    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an installed entry
    pub(crate) fn record_insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a removed entry under its cause's counter
    pub(crate) fn record_removal(&self, cause: RemovalCause) {
        match cause {
            RemovalCause::Explicit => self.explicit_removals.fetch_add(1, Ordering::Relaxed),
            RemovalCause::Replaced => self.replacements.fetch_add(1, Ordering::Relaxed),
            RemovalCause::Expired => self.expirations.fetch_add(1, Ordering::Relaxed),
            RemovalCause::Collected => self.collected.fetch_add(1, Ordering::Relaxed),
            // Reserved; the engine never emits it
            RemovalCause::Size => 0,
        };
    }

    /// Get current statistics snapshot
    pub(crate) fn snapshot(&self, size: usize, watermark: Option<usize>) -> CacheStats {
        CacheStats {
            size,
            watermark,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            explicit_removals: self.explicit_removals.load(Ordering::Relaxed),
            replacements: self.replacements.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            collected: self.collected.load(Ordering::Relaxed),
        }
    }

    /// Reset all metrics to zero
    pub(crate) fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.inserts.store(0, Ordering::Relaxed);
        self.explicit_removals.store(0, Ordering::Relaxed);
        self.replacements.store(0, Ordering::Relaxed);
        self.expirations.store(0, Ordering::Relaxed);
        self.collected.store(0, Ordering::Relaxed);
    }
}
