//! Cache configuration types and builder patterns
//!
//! This module provides configuration types for customizing cache behavior,
//! including the reclamation mode, default TTL, and the soft-mode memory
//! watermark.

use std::time::Duration;

/// Entry count above which a soft cache treats itself as under memory
/// pressure when no explicit watermark is configured
pub const DEFAULT_SOFT_WATERMARK: usize = 4096;

/// How a cache reclaims entries on its own, beyond TTL and explicit removal
///
/// Selected once at construction. All modes still honor TTL expiration and
/// explicit removal; the mode only governs automatic reclamation, reported
/// with [`RemovalCause::Collected`].
///
/// [`RemovalCause::Collected`]: crate::RemovalCause::Collected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReclaimMode {
    /// Entries are owned outright and never reclaimed automatically
    #[default]
    Strong,
    /// Not-recently-used entries are reclaimed by the sweep
    ///
    /// An entry is severed by the first sweep that begins after a full
    /// sweep interval passed with no access to it. Installation and every
    /// successful read count as an access.
    Weak,
    /// Least-recently-used entries are reclaimed under memory pressure
    ///
    /// While the live entry count stays at or below the watermark nothing
    /// is reclaimed; above it, sweeps sever the least recently touched
    /// entries until the count is back at the watermark.
    Soft,
    /// Entries never yield a value and exist only to signal cleanup
    ///
    /// Every installed entry reads as absent and is reclaimed by the first
    /// operation after installation, producing exactly one
    /// `Collected` notification with no value.
    Phantom,
}

/// Configuration for cache behavior
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Automatic reclamation mode
    pub mode: ReclaimMode,

    /// Default time-to-live for entries (None = no expiration)
    ///
    /// A per-entry TTL carried by a [`ValueInfo`] overrides this.
    ///
    /// [`ValueInfo`]: crate::ValueInfo
    pub default_ttl: Option<Duration>,

    /// Memory-pressure watermark for [`ReclaimMode::Soft`]
    ///
    /// `None` falls back to [`DEFAULT_SOFT_WATERMARK`]. Ignored by the
    /// other modes.
    pub watermark: Option<usize>,

    /// Whether to collect detailed access metrics
    pub track_metrics: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            mode: ReclaimMode::Strong,
            default_ttl: None,
            watermark: None,
            track_metrics: false,
        }
    }
}

impl CacheConfig {
    /// Create a new configuration builder
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Quick preset for a strong cache (no automatic reclamation)
    pub fn strong() -> Self {
        Self::default()
    }

    /// Quick preset for a weak cache (not-recently-used reclamation)
    pub fn weak() -> Self {
        Self { mode: ReclaimMode::Weak, ..Self::default() }
    }

    /// Quick preset for a soft cache with an explicit watermark
    ///
    /// # Example
    /// ```
    /// use cellar_cache::CacheConfig;
    ///
    /// let config = CacheConfig::soft(10_000);
    /// assert_eq!(config.watermark, Some(10_000));
    /// ```
    pub fn soft(watermark: usize) -> Self {
        Self { mode: ReclaimMode::Soft, watermark: Some(watermark), ..Self::default() }
    }

    /// Quick preset for a phantom (notification-only) cache
    pub fn phantom() -> Self {
        Self { mode: ReclaimMode::Phantom, ..Self::default() }
    }

    /// Quick preset for a TTL-only cache
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    ///
    /// use cellar_cache::CacheConfig;
    ///
    /// let config = CacheConfig::ttl(Duration::from_secs(3600));
    /// assert_eq!(config.default_ttl, Some(Duration::from_secs(3600)));
    /// ```
    pub fn ttl(duration: Duration) -> Self {
        Self { default_ttl: Some(duration), ..Self::default() }
    }

    /// The watermark a soft cache actually sweeps against
    pub(crate) fn effective_watermark(&self) -> usize {
        self.watermark.unwrap_or(DEFAULT_SOFT_WATERMARK)
    }
}

/// Builder for CacheConfig with fluent API
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    config: CacheConfig,
}

impl CacheConfigBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the reclamation mode
    pub fn mode(mut self, mode: ReclaimMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Set the default time-to-live for entries
    pub fn default_ttl(mut self, duration: Duration) -> Self {
        self.config.default_ttl = Some(duration);
        self
    }

    /// Set the soft-mode memory watermark
    pub fn watermark(mut self, watermark: usize) -> Self {
        self.config.watermark = Some(watermark);
        self
    }

    /// Enable or disable metrics tracking
    pub fn track_metrics(mut self, enabled: bool) -> Self {
        self.config.track_metrics = enabled;
        self
    }

    /// Build the configuration
    pub fn build(self) -> CacheConfig {
        self.config
    }
}
