//! Removal vocabulary: causes, the listener callback, and producer results
//!
//! Every entry that leaves the cache is classified with exactly one
//! [`RemovalCause`] and reported at most once to the configured
//! [`RemovalListener`]. Producers that want to control caching per entry
//! return a [`ValueInfo`] instead of a bare value.

use std::fmt;
use std::time::Duration;

/// The reason an entry was removed from the cache
///
/// Exactly one cause is ever recorded per entry; the first removal path to
/// claim an entry wins and later paths are silent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemovalCause {
    /// Removed explicitly via [`Cache::remove`] or [`Cache::clear`]
    ///
    /// [`Cache::remove`]: crate::Cache::remove
    /// [`Cache::clear`]: crate::Cache::clear
    Explicit,
    /// Overwritten by a later [`Cache::put`] or recomputation for the same
    /// key
    ///
    /// [`Cache::put`]: crate::Cache::put
    Replaced,
    /// Reclaimed automatically by the configured [`ReclaimMode`]
    ///
    /// [`ReclaimMode`]: crate::ReclaimMode
    Collected,
    /// The entry's time-to-live elapsed
    Expired,
    /// Reserved for a size-bounded eviction policy
    ///
    /// The core engine never emits this cause; it exists as a hook for
    /// callers layering a size bound on top of the cache.
    Size,
}

impl RemovalCause {
    /// True for causes the cache decided on its own (not caller-driven)
    pub fn was_automatic(self) -> bool {
        matches!(self, Self::Collected | Self::Expired | Self::Size)
    }
}

impl fmt::Display for RemovalCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit => write!(f, "explicit"),
            Self::Replaced => write!(f, "replaced"),
            Self::Collected => write!(f, "collected"),
            Self::Expired => write!(f, "expired"),
            Self::Size => write!(f, "size"),
        }
    }
}

/// A callback invoked exactly once for each entry removed from the cache
///
/// The callback receives the key, the value the entry held at invalidation
/// time (`None` when the entry cached an absent value or the value was
/// already reclaimed), and the winning [`RemovalCause`].
///
/// The listener runs synchronously on whichever calling thread happened to
/// trigger the removal or a queue drain, so it must not assume a fixed
/// thread identity. **Do not call back into the same cache from inside the
/// listener**: removal dispatch can run in the middle of a public
/// operation and re-entering the cache may deadlock on the same key's
/// compute slot. Listener panics are not caught and propagate to the
/// triggering caller.
pub trait RemovalListener<K, V>: Send + Sync {
    /// Report one removed entry
    fn on_removal(&self, key: &K, value: Option<V>, cause: RemovalCause);
}

impl<K, V, F> RemovalListener<K, V> for F
where
    F: Fn(&K, Option<V>, RemovalCause) + Send + Sync,
{
    fn on_removal(&self, key: &K, value: Option<V>, cause: RemovalCause) {
        self(key, value, cause)
    }
}

/// A producer result pairing a value with an optional per-entry TTL
///
/// Consumed once by the cache to construct a new entry and never stored.
/// The value may be absent: caching "no value" for a key is legitimate and
/// distinguishable from the key being unmapped (see
/// [`Cache::get_nullable`]).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use cellar_cache::ValueInfo;
///
/// // A value with a 30 second override TTL
/// let info = ValueInfo::new(42).with_ttl(Duration::from_secs(30));
/// assert_eq!(info.ttl(), Some(Duration::from_secs(30)));
///
/// // A cached absent value, using the cache-wide default TTL
/// let absent: ValueInfo<i32> = ValueInfo::null();
/// assert_eq!(absent.ttl(), None);
/// ```
///
/// [`Cache::get_nullable`]: crate::Cache::get_nullable
#[derive(Debug, Clone)]
pub struct ValueInfo<V> {
    value: Option<V>,
    ttl: Option<Duration>,
}

impl<V> ValueInfo<V> {
    /// Create an info carrying a present value
    pub fn new(value: V) -> Self {
        Self { value: Some(value), ttl: None }
    }

    /// Create an info caching an absent value
    ///
    /// The key becomes mapped, but reads through [`Cache::get`] report it
    /// as absent; only [`Cache::get_nullable`] can tell the difference.
    ///
    /// [`Cache::get`]: crate::Cache::get
    /// [`Cache::get_nullable`]: crate::Cache::get_nullable
    pub fn null() -> Self {
        Self { value: None, ttl: None }
    }

    /// Override the cache-wide default TTL for this entry
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// The per-entry TTL override, if any
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Split into the stored value and the TTL override
    pub(crate) fn into_parts(self) -> (Option<V>, Option<Duration>) {
        (self.value, self.ttl)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for listener.
    use super::*;

    /// Validates `RemovalCause::was_automatic` behavior for the cause
    /// classification scenario.
    ///
    /// Assertions:
    /// - Ensures `RemovalCause::Collected.was_automatic()` evaluates to true.
    /// - Ensures `RemovalCause::Expired.was_automatic()` evaluates to true.
    /// - Ensures `!RemovalCause::Explicit.was_automatic()` evaluates to true.
    /// - Ensures `!RemovalCause::Replaced.was_automatic()` evaluates to true.
    #[test]
    fn test_removal_cause_was_automatic() {
        assert!(RemovalCause::Collected.was_automatic());
        assert!(RemovalCause::Expired.was_automatic());
        assert!(RemovalCause::Size.was_automatic());
        assert!(!RemovalCause::Explicit.was_automatic());
        assert!(!RemovalCause::Replaced.was_automatic());
    }

    /// Validates `RemovalCause` display formatting for the cause display
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms `RemovalCause::Expired.to_string()` equals `"expired"`.
    #[test]
    fn test_removal_cause_display() {
        assert_eq!(RemovalCause::Explicit.to_string(), "explicit");
        assert_eq!(RemovalCause::Replaced.to_string(), "replaced");
        assert_eq!(RemovalCause::Collected.to_string(), "collected");
        assert_eq!(RemovalCause::Expired.to_string(), "expired");
        assert_eq!(RemovalCause::Size.to_string(), "size");
    }

    /// Validates closure-backed `RemovalListener` dispatch for the blanket
    /// impl scenario.
    ///
    /// Assertions:
    /// - Confirms the recorded notification equals `("k", Some(1),
    ///   RemovalCause::Explicit)`.
    #[test]
    fn test_closure_listener() {
        use std::sync::Mutex;

        let seen: Mutex<Vec<(String, Option<i32>, RemovalCause)>> = Mutex::new(Vec::new());
        let listener = |key: &String, value: Option<i32>, cause: RemovalCause| {
            seen.lock().unwrap().push((key.clone(), value, cause));
        };

        listener.on_removal(&"k".to_string(), Some(1), RemovalCause::Explicit);

        let recorded = seen.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0], ("k".to_string(), Some(1), RemovalCause::Explicit));
    }

    /// Validates `ValueInfo` constructors for the producer result scenario.
    ///
    /// Assertions:
    /// - Confirms `ValueInfo::new(5).into_parts()` equals `(Some(5), None)`.
    /// - Confirms the null info splits into `(None, Some(ttl))`.
    #[test]
    fn test_value_info_parts() {
        let (value, ttl) = ValueInfo::new(5).into_parts();
        assert_eq!(value, Some(5));
        assert_eq!(ttl, None);

        let info: ValueInfo<i32> = ValueInfo::null().with_ttl(Duration::from_secs(1));
        let (value, ttl) = info.into_parts();
        assert_eq!(value, None);
        assert_eq!(ttl, Some(Duration::from_secs(1)));
    }
}
