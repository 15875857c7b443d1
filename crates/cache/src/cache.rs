//! Thread-safe cache facade
//!
//! [`Cache`] is a cheap-to-clone handle over the shared engine. All
//! methods take `&self`; clones of a cache observe the same entries,
//! listener, and statistics.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use crate::clock::{Clock, SystemClock};
use crate::config::CacheConfig;
use crate::core::Engine;
use crate::listener::{RemovalListener, ValueInfo};
use crate::stats::CacheStats;

/// A concurrent key-value cache with pluggable reclamation
///
/// Values are owned by the cache and handed out by clone. An optional
/// removal listener observes every entry that leaves the map, tagged with
/// the single cause that removed it.
///
/// # Example
/// ```
/// use cellar_cache::{Cache, CacheConfig};
///
/// let cache: Cache<String, u32> = Cache::new(CacheConfig::strong());
/// cache.put("answer".to_string(), 42);
/// assert_eq!(cache.get(&"answer".to_string()), Some(42));
///
/// let computed = cache.get_or_compute("other".to_string(), |key| key.len() as u32);
/// assert_eq!(computed, Some(5));
/// ```
pub struct Cache<K, V, C = SystemClock>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock,
{
    engine: Arc<Engine<K, V, C>>,
}

impl<K, V> Cache<K, V, SystemClock>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a new cache with the given configuration using system clock
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }

    /// Create a new cache with a removal listener using system clock
    pub fn with_listener(config: CacheConfig, listener: Arc<dyn RemovalListener<K, V>>) -> Self {
        Self::with_listener_and_clock(config, listener, SystemClock)
    }
}

impl<K, V, C> Cache<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock,
{
    /// Create a new cache with a custom clock (useful for testing)
    pub fn with_clock(config: CacheConfig, clock: C) -> Self {
        Self { engine: Arc::new(Engine::new(config, None, clock)) }
    }

    /// Create a new cache with both a removal listener and a custom clock
    pub fn with_listener_and_clock(
        config: CacheConfig,
        listener: Arc<dyn RemovalListener<K, V>>,
        clock: C,
    ) -> Self {
        Self { engine: Arc::new(Engine::new(config, Some(listener), clock)) }
    }

    /// Insert a value, replacing any previous entry for the key
    ///
    /// Replacing a live entry notifies the listener once with
    /// [`RemovalCause::Replaced`] and the old value.
    ///
    /// [`RemovalCause::Replaced`]: crate::RemovalCause::Replaced
    pub fn put(&self, key: K, value: V) {
        self.engine.put(key, value);
    }

    /// Insert from a [`ValueInfo`], honoring its null payload and TTL
    /// override
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    ///
    /// use cellar_cache::{Cache, CacheConfig, ValueInfo};
    ///
    /// let cache: Cache<&str, u32> = Cache::new(CacheConfig::strong());
    /// cache.put_info("short-lived", ValueInfo::new(1).with_ttl(Duration::from_secs(30)));
    /// cache.put_info("known-absent", ValueInfo::null());
    ///
    /// assert_eq!(cache.get(&"known-absent"), None);
    /// assert_eq!(cache.get_nullable(&"known-absent"), Some(None));
    /// ```
    pub fn put_info(&self, key: K, info: ValueInfo<V>) {
        self.engine.put_info(key, info);
    }

    /// Get a value from the cache
    ///
    /// Returns `None` if the key is unmapped, expired, reclaimed, or
    /// mapped to a cached null. Use [`Cache::get_nullable`] to tell the
    /// last case apart.
    pub fn get(&self, key: &K) -> Option<V> {
        self.engine.get(key)
    }

    /// Get a value, distinguishing a cached null from absence
    ///
    /// `Some(None)` means the key is mapped to a deliberately cached
    /// "no value"; outer `None` means no live entry exists.
    pub fn get_nullable(&self, key: &K) -> Option<Option<V>> {
        self.engine.get_nullable(key)
    }

    /// Return the cached value or atomically compute and install one
    ///
    /// The producer runs at most once per population event, even when
    /// many threads race on the same absent key; losers observe the
    /// winner's value. Returns `None` only in phantom mode, where nothing
    /// is ever readable.
    pub fn get_or_compute<F>(&self, key: K, producer: F) -> Option<V>
    where
        F: FnOnce(&K) -> V,
    {
        self.engine.get_or_compute(key, producer)
    }

    /// Like [`Cache::get_or_compute`], with a producer that may cache a
    /// null or decline to cache
    ///
    /// Returning `None` from the producer installs nothing;
    /// `Some(ValueInfo::null())` caches the absence so later lookups skip
    /// the producer.
    pub fn get_or_compute_nullable<F>(&self, key: K, producer: F) -> Option<Option<V>>
    where
        F: FnOnce(&K) -> Option<ValueInfo<V>>,
    {
        self.engine.get_or_compute_nullable(key, producer)
    }

    /// Remove a key, returning the live value it held
    pub fn remove(&self, key: &K) -> Option<V> {
        self.engine.remove(key)
    }

    /// True iff a live, unexpired entry (value or cached null) exists
    pub fn contains(&self, key: &K) -> bool {
        self.engine.contains(key)
    }

    /// Reset a live entry's TTL relative to now
    ///
    /// Returns whether an entry was extended; never creates one.
    pub fn expire(&self, key: &K, ttl: Duration) -> bool {
        self.engine.expire(key, ttl)
    }

    /// Number of mapped entries (expired entries may still be counted
    /// until an operation touches them)
    pub fn len(&self) -> usize {
        self.engine.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.engine.is_empty()
    }

    /// Remove every live entry, notifying each as an explicit removal
    pub fn clear(&self) {
        self.engine.clear();
    }

    /// Run the reclamation sweep and finalize pending removals
    ///
    /// Safe to call from a maintenance thread at any cadence; idempotent
    /// when nothing new has become reclaimable.
    pub fn clean(&self) {
        self.engine.clean();
    }

    /// Get current statistics snapshot
    pub fn stats(&self) -> CacheStats {
        self.engine.stats()
    }

    /// Zero the statistics counters
    ///
    /// Entries are untouched; only the metrics start over. Useful when
    /// sampling hit rates over successive windows.
    pub fn reset_stats(&self) {
        self.engine.reset_stats();
    }
}

impl<K, V> Default for Cache<K, V, SystemClock>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl<K, V, C> Clone for Cache<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock,
{
    fn clone(&self) -> Self {
        Self { engine: Arc::clone(&self.engine) }
    }
}
