//! Cache utilities for monitoring, reporting, and management
//!
//! This module provides helper utilities for cache management, including
//! metrics reporting, health checks, and prewarming tools.

use std::fmt;
use std::hash::Hash;

use tracing::{info, warn};

use crate::cache::Cache;
use crate::clock::Clock;
use crate::stats::CacheStats;

/// Cache health status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheHealth {
    /// Cache is operating normally
    Healthy,
    /// Cache hit rate is low, consider tuning
    LowHitRate,
    /// Cache is near its soft watermark, consider raising it
    NearCapacity,
    /// Cache has both low hit rate and near-watermark fill
    Critical,
}

impl fmt::Display for CacheHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Healthy => write!(f, "Healthy"),
            Self::LowHitRate => write!(f, "Low Hit Rate"),
            Self::NearCapacity => write!(f, "Near Capacity"),
            Self::Critical => write!(f, "Critical"),
        }
    }
}

/// Cache health report with diagnostics
#[derive(Debug, Clone)]
pub struct CacheHealthReport {
    /// Overall health status
    pub health: CacheHealth,
    /// Current cache statistics
    pub stats: CacheStats,
    /// Recommendations for optimization
    pub recommendations: Vec<String>,
}

impl CacheHealthReport {
    /// Generate a health report for a cache
    ///
    /// # Thresholds
    /// - Low hit rate: < 50% over more than 100 accesses
    /// - Near capacity: > 85% of the soft watermark
    ///
    /// # Example
    /// ```
    /// use cellar_cache::utils::CacheHealthReport;
    /// use cellar_cache::{Cache, CacheConfig};
    ///
    /// let cache: Cache<String, i32> =
    ///     Cache::new(CacheConfig::builder().track_metrics(true).build());
    ///
    /// let report = CacheHealthReport::new(&cache);
    /// println!("{}", report);
    /// ```
    pub fn new<K, V, C>(cache: &Cache<K, V, C>) -> Self
    where
        K: Eq + Hash + Clone,
        V: Clone,
        C: Clock,
    {
        let stats = cache.stats();
        let mut recommendations = Vec::new();

        let low_hit_rate = stats.hit_rate() < 0.5 && stats.total_accesses() > 100;
        if low_hit_rate {
            recommendations.push(format!(
                "Hit rate is {:.2}%. Consider a longer TTL or a less aggressive reclaim mode.",
                stats.hit_rate() * 100.0
            ));
        }

        let near_capacity =
            if let Some(fill_pct) = stats.fill_percentage() { fill_pct > 0.85 } else { false };
        if near_capacity {
            recommendations.push(format!(
                "Cache is {:.1}% of its watermark. Consider raising the watermark.",
                stats.fill_percentage().unwrap_or_default() * 100.0
            ));
        }

        if stats.total_accesses() > 0 {
            let collection_rate = stats.collected as f64 / stats.total_accesses() as f64;
            if collection_rate > 0.2 {
                recommendations.push(format!(
                    "High reclamation rate: {:.2}%. The watermark may be too low for the workload.",
                    collection_rate * 100.0
                ));
            }

            let expiration_rate = stats.expirations as f64 / stats.total_accesses() as f64;
            if expiration_rate > 0.3 {
                recommendations.push(format!(
                    "High expiration rate: {:.2}%. Consider increasing TTL.",
                    expiration_rate * 100.0
                ));
            }
        }

        let health = match (low_hit_rate, near_capacity) {
            (true, true) => CacheHealth::Critical,
            (true, false) => CacheHealth::LowHitRate,
            (false, true) => CacheHealth::NearCapacity,
            (false, false) => CacheHealth::Healthy,
        };

        Self { health, stats, recommendations }
    }

    /// Log the health report using tracing
    pub fn log(&self) {
        match self.health {
            CacheHealth::Healthy => {
                info!(
                    health = %self.health,
                    hit_rate = self.stats.hit_rate(),
                    size = self.stats.size,
                    "Cache health check: Healthy"
                );
            }
            CacheHealth::LowHitRate | CacheHealth::NearCapacity | CacheHealth::Critical => {
                warn!(
                    health = %self.health,
                    hit_rate = self.stats.hit_rate(),
                    size = self.stats.size,
                    watermark = ?self.stats.watermark,
                    "Cache health check: Issues detected"
                );
                for rec in &self.recommendations {
                    warn!(recommendation = %rec, "Cache optimization recommendation");
                }
            }
        }
    }
}

impl fmt::Display for CacheHealthReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cache Health Report")?;
        writeln!(f, "===================")?;
        writeln!(f, "Status: {}", self.health)?;
        writeln!(f)?;
        writeln!(f, "Statistics:")?;
        writeln!(f, "  Size: {}/{:?}", self.stats.size, self.stats.watermark)?;
        writeln!(f, "  Hits: {}", self.stats.hits)?;
        writeln!(f, "  Misses: {}", self.stats.misses)?;
        writeln!(f, "  Hit Rate: {:.2}%", self.stats.hit_rate() * 100.0)?;
        writeln!(f, "  Collected: {}", self.stats.collected)?;
        writeln!(f, "  Expirations: {}", self.stats.expirations)?;
        if let Some(fill_pct) = self.stats.fill_percentage() {
            writeln!(f, "  Fill: {:.1}%", fill_pct * 100.0)?;
        }

        if !self.recommendations.is_empty() {
            writeln!(f)?;
            writeln!(f, "Recommendations:")?;
            for (i, rec) in self.recommendations.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, rec)?;
            }
        }

        Ok(())
    }
}

/// Cache metrics reporter for periodic monitoring
///
/// # Example
/// ```
/// use cellar_cache::utils::MetricsReporter;
/// use cellar_cache::{Cache, CacheConfig};
///
/// let cache: Cache<String, i32> =
///     Cache::new(CacheConfig::builder().track_metrics(true).build());
///
/// let reporter = MetricsReporter::new("my_cache");
/// reporter.report(&cache);
/// ```
pub struct MetricsReporter {
    cache_name: String,
}

impl MetricsReporter {
    /// Create a new metrics reporter
    pub fn new(cache_name: impl Into<String>) -> Self {
        Self { cache_name: cache_name.into() }
    }

    /// Report current cache metrics using tracing
    pub fn report<K, V, C>(&self, cache: &Cache<K, V, C>)
    where
        K: Eq + Hash + Clone,
        V: Clone,
        C: Clock,
    {
        let stats = cache.stats();
        info!(
            cache = %self.cache_name,
            size = stats.size,
            watermark = ?stats.watermark,
            hits = stats.hits,
            misses = stats.misses,
            hit_rate = format!("{:.2}%", stats.hit_rate() * 100.0),
            collected = stats.collected,
            expirations = stats.expirations,
            "Cache metrics report"
        );
    }
}

/// Cache prewarming utility for loading frequently accessed data
///
/// # Example
/// ```
/// use cellar_cache::utils::CacheWarmer;
/// use cellar_cache::{Cache, CacheConfig};
///
/// let cache: Cache<String, String> = Cache::new(CacheConfig::strong());
///
/// let warm_data = vec![
///     ("config".to_string(), "value1".to_string()),
///     ("user_prefs".to_string(), "value2".to_string()),
/// ];
///
/// let warmer = CacheWarmer::new();
/// warmer.warm(&cache, warm_data);
/// ```
pub struct CacheWarmer;

impl CacheWarmer {
    /// Create a new cache warmer
    pub fn new() -> Self {
        Self
    }

    /// Warm cache with provided data
    pub fn warm<K, V, C>(&self, cache: &Cache<K, V, C>, data: Vec<(K, V)>)
    where
        K: Eq + Hash + Clone,
        V: Clone,
        C: Clock,
    {
        let count = data.len();
        info!(count, "Warming cache with {} entries", count);

        for (key, value) in data {
            cache.put(key, value);
        }

        info!(count, final_size = cache.len(), "Cache warming completed");
    }

    /// Warm cache using a loader function
    ///
    /// The loader is called for each key; keys it declines are skipped.
    pub fn warm_with_loader<K, V, C, F>(&self, cache: &Cache<K, V, C>, keys: Vec<K>, mut loader: F)
    where
        K: Eq + Hash + Clone,
        V: Clone,
        C: Clock,
        F: FnMut(&K) -> Option<V>,
    {
        let count = keys.len();
        info!(count, "Warming cache with loader for {} keys", count);

        let mut loaded_count = 0;
        for key in keys {
            if let Some(value) = loader(&key) {
                cache.put(key, value);
                loaded_count += 1;
            }
        }

        info!(
            requested = count,
            loaded = loaded_count,
            final_size = cache.len(),
            "Cache warming with loader completed"
        );
    }
}

impl Default for CacheWarmer {
    fn default() -> Self {
        Self::new()
    }
}
