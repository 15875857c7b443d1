//! Core cache engine
//!
//! The engine owns the concurrent map and implements every public
//! operation: atomic get-or-compute under the map's per-key entry lock,
//! installation with TTL resolution, lazy identity-guarded expiration,
//! explicit removal, and drain-queue finalization. Each entry that leaves
//! the map is classified with exactly one [`RemovalCause`] and reported to
//! the listener exactly once, always after the entry has left the map and
//! never while a map shard lock is held.
//!
//! Locking discipline: the drain queue is polled (and its notifications
//! dispatched) at the start of every public operation, before any shard
//! lock is taken; operation-local notifications are dispatched at the end,
//! after all guards are dropped. Sweeps take shard locks and then the
//! queue lock, drains take them in the opposite order but never
//! simultaneously, so the two cannot deadlock.

use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::trace;

use crate::clock::Clock;
use crate::config::{CacheConfig, ReclaimMode};
use crate::entry::{Cell, NEVER};
use crate::listener::{RemovalCause, RemovalListener};
use crate::policy::ReclaimPolicy;
use crate::queue::DrainQueue;
use crate::stats::{CacheStats, MetricsCollector};

/// One pending removal notification
struct Notice<K, V> {
    key: K,
    value: Option<V>,
    cause: RemovalCause,
}

/// The concurrent map plus every cache operation
///
/// Shared behind an `Arc` by the public [`Cache`](crate::Cache) facade.
pub(crate) struct Engine<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock,
{
    map: DashMap<K, Arc<Cell<V>>>,
    queue: DrainQueue<K, V>,
    policy: ReclaimPolicy,
    config: CacheConfig,
    listener: Option<Arc<dyn RemovalListener<K, V>>>,
    metrics: MetricsCollector,
    clock: C,
    next_id: AtomicU64,
}

impl<K, V, C> Engine<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock,
{
    pub(crate) fn new(
        config: CacheConfig,
        listener: Option<Arc<dyn RemovalListener<K, V>>>,
        clock: C,
    ) -> Self {
        let policy = ReclaimPolicy::new(config.mode, config.effective_watermark());
        Self {
            map: DashMap::new(),
            queue: DrainQueue::new(),
            policy,
            config,
            listener,
            metrics: MetricsCollector::new(),
            clock,
            next_id: AtomicU64::new(1),
        }
    }

    //==========================================================================
    // Reads
    //==========================================================================

    /// Look up a key, folding a cached null into "absent"
    pub(crate) fn get(&self, key: &K) -> Option<V> {
        self.get_nullable(key).flatten()
    }

    /// Look up a key, distinguishing "unmapped or expired" (outer `None`)
    /// from "mapped to a cached null" (`Some(None)`)
    pub(crate) fn get_nullable(&self, key: &K) -> Option<Option<V>> {
        self.drain();
        let now = self.now_ms();
        let mut notices = Vec::new();

        let result = match self.lookup_cell(key) {
            None => None,
            Some(cell) => {
                if cell.is_expired(now) {
                    self.expire_lazily(key, &cell, &mut notices);
                    None
                } else {
                    let value = cell.value();
                    if value.is_some() {
                        cell.touch(self.policy.epoch(), now);
                    }
                    value
                }
            }
        };

        if self.config.track_metrics {
            if result.is_some() {
                self.metrics.record_hit();
            } else {
                self.metrics.record_miss();
            }
        }
        self.dispatch(notices);
        result
    }

    /// True iff a live, unexpired entry exists for the key
    ///
    /// Lazily expires (with notification) an expired entry it encounters.
    pub(crate) fn contains(&self, key: &K) -> bool {
        self.drain();
        let now = self.now_ms();
        let mut notices = Vec::new();

        let present = match self.lookup_cell(key) {
            None => false,
            Some(cell) => {
                if cell.is_expired(now) {
                    self.expire_lazily(key, &cell, &mut notices);
                    false
                } else {
                    cell.has_value()
                }
            }
        };

        self.dispatch(notices);
        present
    }

    //==========================================================================
    // Get-or-compute
    //==========================================================================

    /// Atomically return the cached value or compute and install one
    ///
    /// The producer runs under the map's entry lock for this key, so it is
    /// invoked at most once per population event even under concurrent
    /// callers. A producer panic installs nothing.
    pub(crate) fn get_or_compute<F>(&self, key: K, producer: F) -> Option<V>
    where
        F: FnOnce(&K) -> V,
    {
        self.compute_slot(key, |key| Some((Some(producer(key)), None))).flatten()
    }

    /// Like [`Engine::get_or_compute`], but the producer may cache a null
    /// or decline to cache at all by returning `None`
    pub(crate) fn get_or_compute_nullable<F>(&self, key: K, producer: F) -> Option<Option<V>>
    where
        F: FnOnce(&K) -> Option<crate::listener::ValueInfo<V>>,
    {
        self.compute_slot(key, |key| producer(key).map(crate::listener::ValueInfo::into_parts))
    }

    /// Shared compute path: `fill` returns `(value, ttl override)` or
    /// `None` for "do not cache"
    fn compute_slot<F>(&self, key: K, fill: F) -> Option<Option<V>>
    where
        F: FnOnce(&K) -> Option<(Option<V>, Option<Duration>)>,
    {
        self.drain();
        let now = self.now_ms();
        let mut notices = Vec::new();
        let mut hit = false;
        let mut installed = false;

        let lookup_key = key.clone();
        let result = match self.map.entry(key) {
            Entry::Occupied(mut occupied) => {
                let cell = Arc::clone(occupied.get());
                if !cell.is_expired(now) && cell.has_value() {
                    cell.touch(self.policy.epoch(), now);
                    hit = true;
                    cell.value()
                } else {
                    // Stale: expired, severed, or a phantom tombstone
                    match fill(&lookup_key) {
                        Some((value, ttl)) => {
                            let fresh = self.new_cell(value, ttl, now);
                            let old = occupied.insert(Arc::clone(&fresh));
                            self.policy.on_install(&lookup_key, &fresh, &self.queue);
                            self.retire_cell(
                                lookup_key,
                                &old,
                                RemovalCause::Replaced,
                                now,
                                &mut notices,
                            );
                            installed = true;
                            fresh.value()
                        }
                        None => {
                            // Do-not-cache: the stale occupant still goes
                            let old = occupied.remove();
                            self.retire_cell(
                                lookup_key,
                                &old,
                                RemovalCause::Expired,
                                now,
                                &mut notices,
                            );
                            None
                        }
                    }
                }
            }
            Entry::Vacant(vacant) => match fill(&lookup_key) {
                Some((value, ttl)) => {
                    let fresh = self.new_cell(value, ttl, now);
                    let _ = vacant.insert(Arc::clone(&fresh));
                    self.policy.on_install(&lookup_key, &fresh, &self.queue);
                    installed = true;
                    fresh.value()
                }
                None => None,
            },
        };

        if self.config.track_metrics {
            if hit {
                self.metrics.record_hit();
            } else {
                self.metrics.record_miss();
            }
            if installed {
                self.metrics.record_insert();
            }
        }
        self.maybe_pressure_sweep(&mut notices);
        self.dispatch(notices);
        result
    }

    //==========================================================================
    // Writes
    //==========================================================================

    /// Install a value, replacing any previous entry for the key
    pub(crate) fn put(&self, key: K, value: V) {
        self.insert_value(key, Some(value), None);
    }

    /// Install from a producer result, honoring its TTL override and null
    pub(crate) fn put_info(&self, key: K, info: crate::listener::ValueInfo<V>) {
        let (value, ttl) = info.into_parts();
        self.insert_value(key, value, ttl);
    }

    fn insert_value(&self, key: K, value: Option<V>, ttl: Option<Duration>) {
        self.drain();
        let now = self.now_ms();
        let mut notices = Vec::new();

        let fresh = self.new_cell(value, ttl, now);
        let old = self.map.insert(key.clone(), Arc::clone(&fresh));
        self.policy.on_install(&key, &fresh, &self.queue);
        if let Some(old) = old {
            self.retire_cell(key, &old, RemovalCause::Replaced, now, &mut notices);
        }

        if self.config.track_metrics {
            self.metrics.record_insert();
        }
        self.maybe_pressure_sweep(&mut notices);
        self.dispatch(notices);
    }

    /// Remove a key, returning the live value it held
    ///
    /// A live entry is reported `Explicit`; an absent, expired-in-place, or
    /// already-severed entry produces no `Explicit` notification.
    pub(crate) fn remove(&self, key: &K) -> Option<V> {
        self.drain();
        let now = self.now_ms();
        let mut notices = Vec::new();
        let mut removed_value = None;

        if let Some((owned_key, cell)) = self.map.remove(key) {
            if !cell.is_pending_reclaim() {
                let cause = if cell.is_expired(now) {
                    RemovalCause::Expired
                } else {
                    RemovalCause::Explicit
                };
                if let Some(value) = cell.invalidate(cause) {
                    if cause == RemovalCause::Explicit {
                        removed_value = value.clone();
                    }
                    notices.push(Notice { key: owned_key, value, cause });
                }
            }
        }

        self.dispatch(notices);
        removed_value
    }

    /// Reset a live entry's expiration relative to now
    ///
    /// Never creates an entry; returns whether a live entry was extended.
    pub(crate) fn expire(&self, key: &K, ttl: Duration) -> bool {
        self.drain();
        let now = self.now_ms();
        let mut notices = Vec::new();

        let extended = match self.lookup_cell(key) {
            None => false,
            Some(cell) => {
                if cell.is_expired(now) {
                    self.expire_lazily(key, &cell, &mut notices);
                    false
                } else if cell.has_value() {
                    cell.set_expires_at(now.saturating_add(duration_millis(ttl)));
                    true
                } else {
                    false
                }
            }
        };

        self.dispatch(notices);
        extended
    }

    /// Remove every live entry with cause `Explicit`, then drain
    pub(crate) fn clear(&self) {
        self.drain();
        let now = self.now_ms();
        let mut notices = Vec::new();

        let entries: Vec<(K, Arc<Cell<V>>)> =
            self.map.iter().map(|entry| (entry.key().clone(), Arc::clone(entry.value()))).collect();
        for (key, cell) in entries {
            if self.map.remove_if(&key, |_, current| current.id() == cell.id()).is_some() {
                self.retire_cell(key, &cell, RemovalCause::Explicit, now, &mut notices);
            }
        }

        self.drain_into(&mut notices);
        self.dispatch(notices);
    }

    //==========================================================================
    // Maintenance
    //==========================================================================

    /// Run the reclamation sweep, then finalize everything pending
    ///
    /// Idempotent: once a severed cell has been drained, later calls find
    /// nothing to do. A no-op for [`ReclaimMode::Strong`].
    pub(crate) fn clean(&self) {
        let mut notices = Vec::new();
        self.drain_into(&mut notices);
        self.policy.sweep(&self.map, &self.queue);
        self.drain_into(&mut notices);
        self.dispatch(notices);
    }

    /// Approximate number of mapped entries
    pub(crate) fn len(&self) -> usize {
        self.drain();
        self.map.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Zero the statistics counters without touching entries
    pub(crate) fn reset_stats(&self) {
        self.metrics.reset();
    }

    /// Get current statistics snapshot
    pub(crate) fn stats(&self) -> CacheStats {
        let watermark = if self.policy.mode() == ReclaimMode::Soft {
            Some(self.config.effective_watermark())
        } else {
            None
        };
        self.metrics.snapshot(self.map.len(), watermark)
    }

    //==========================================================================
    // Internals
    //==========================================================================

    fn now_ms(&self) -> u64 {
        self.clock.millis_since_epoch()
    }

    fn lookup_cell(&self, key: &K) -> Option<Arc<Cell<V>>> {
        // Clone out of the shard guard; removal paths below must not run
        // while a read ref into the same shard is held.
        self.map.get(key).map(|entry| Arc::clone(entry.value()))
    }

    fn new_cell(&self, value: Option<V>, ttl: Option<Duration>, now: u64) -> Arc<Cell<V>> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let expires_at = match ttl.or(self.config.default_ttl) {
            Some(ttl) => now.saturating_add(duration_millis(ttl)),
            None => NEVER,
        };
        Arc::new(Cell::new(id, self.policy.wrap(value), expires_at, self.policy.epoch(), now))
    }

    /// Compare-and-remove an expired cell by identity, then classify it
    fn expire_lazily(&self, key: &K, cell: &Arc<Cell<V>>, notices: &mut Vec<Notice<K, V>>) {
        self.map.remove_if(key, |_, current| current.id() == cell.id());
        if let Some(value) = cell.invalidate(RemovalCause::Expired) {
            notices.push(Notice { key: key.clone(), value, cause: RemovalCause::Expired });
        }
    }

    /// Classify and invalidate a cell that just left the map
    ///
    /// Severed and phantom cells are left alone: the drain queue owns their
    /// `Collected` notification. An entry past its expiry is reported
    /// `Expired` rather than the default cause, so replacing something
    /// already logically gone never claims `Replaced`.
    fn retire_cell(
        &self,
        key: K,
        cell: &Arc<Cell<V>>,
        default_cause: RemovalCause,
        now: u64,
        notices: &mut Vec<Notice<K, V>>,
    ) {
        if cell.is_pending_reclaim() {
            return;
        }
        let cause = if cell.is_expired(now) { RemovalCause::Expired } else { default_cause };
        if let Some(value) = cell.invalidate(cause) {
            notices.push(Notice { key, value, cause });
        }
    }

    /// Poll the drain queue and finalize each pending cell
    fn drain_into(&self, notices: &mut Vec<Notice<K, V>>) {
        while let Some((key, cell)) = self.queue.pop() {
            // Only remove the exact cell the queue refers to; the key may
            // have been repopulated since severing.
            self.map.remove_if(&key, |_, current| current.id() == cell.id());
            if let Some(value) = cell.invalidate(RemovalCause::Collected) {
                notices.push(Notice { key, value, cause: RemovalCause::Collected });
            }
        }
    }

    /// Drain and dispatch immediately (clean-on-access entry point)
    fn drain(&self) {
        let mut notices = Vec::new();
        self.drain_into(&mut notices);
        self.dispatch(notices);
    }

    /// Sweep and finalize right away when an insert crossed the watermark
    fn maybe_pressure_sweep(&self, notices: &mut Vec<Notice<K, V>>) {
        if self.policy.under_pressure(self.map.len()) {
            self.policy.sweep(&self.map, &self.queue);
            trace!(pending = self.queue.len(), "pressure sweep enqueued entries");
            self.drain_into(notices);
        }
    }

    /// Report removals: metrics, then log line, then listener, with no
    /// locks held
    fn dispatch(&self, notices: Vec<Notice<K, V>>) {
        for notice in notices {
            if self.config.track_metrics {
                self.metrics.record_removal(notice.cause);
            }
            trace!(cause = %notice.cause, "cache entry removed");
            if let Some(listener) = &self.listener {
                listener.on_removal(&notice.key, notice.value, notice.cause);
            }
        }
    }
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    //! Unit tests for core.
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::clock::MockClock;
    use crate::listener::ValueInfo;

    type Event = (String, Option<i32>, RemovalCause);
    type Log = Arc<Mutex<Vec<Event>>>;

    fn recording_listener() -> (Log, Arc<dyn RemovalListener<String, i32>>) {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let listener = move |key: &String, value: Option<i32>, cause: RemovalCause| {
            sink.lock().unwrap().push((key.clone(), value, cause));
        };
        (log, Arc::new(listener))
    }

    fn engine_with(
        config: CacheConfig,
    ) -> (Engine<String, i32, MockClock>, Log, MockClock) {
        let (log, listener) = recording_listener();
        let clock = MockClock::new();
        let engine = Engine::new(config, Some(listener), clock.clone());
        (engine, log, clock)
    }

    fn events(log: &Log) -> Vec<Event> {
        log.lock().unwrap().clone()
    }

    /// Validates `Engine::put` / `Engine::get` behavior for the basic
    /// storage scenario.
    ///
    /// Assertions:
    /// - Confirms stored values read back.
    /// - Confirms an absent key reads as `None`.
    #[test]
    fn test_put_and_get() {
        let (engine, _, _) = engine_with(CacheConfig::strong());

        engine.put("a".to_string(), 1);
        engine.put("b".to_string(), 2);

        assert_eq!(engine.get(&"a".to_string()), Some(1));
        assert_eq!(engine.get(&"b".to_string()), Some(2));
        assert_eq!(engine.get(&"c".to_string()), None);
        assert_eq!(engine.len(), 2);
    }

    /// Validates `Engine::put` behavior for the replace notification
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms exactly one `Replaced` notification carrying the old
    ///   value.
    #[test]
    fn test_replace_notifies_once() {
        let (engine, log, _) = engine_with(CacheConfig::strong());

        engine.put("k".to_string(), 1);
        engine.put("k".to_string(), 2);

        assert_eq!(engine.get(&"k".to_string()), Some(2));
        assert_eq!(events(&log), vec![("k".to_string(), Some(1), RemovalCause::Replaced)]);
    }

    /// Validates `Engine::remove` behavior for the explicit removal
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms the removed value is returned and reported `Explicit`.
    /// - Confirms removing an absent key notifies nothing.
    #[test]
    fn test_remove_explicit() {
        let (engine, log, _) = engine_with(CacheConfig::strong());

        engine.put("k".to_string(), 7);
        assert_eq!(engine.remove(&"k".to_string()), Some(7));
        assert_eq!(engine.remove(&"k".to_string()), None);
        assert_eq!(engine.remove(&"missing".to_string()), None);

        assert_eq!(events(&log), vec![("k".to_string(), Some(7), RemovalCause::Explicit)]);
    }

    /// Validates null masking for the cached-null scenario.
    ///
    /// Assertions:
    /// - Confirms `get` folds the cached null into absent.
    /// - Confirms `get_nullable` reports `Some(None)` while mapped and
    ///   outer `None` after removal.
    #[test]
    fn test_null_masking() {
        let (engine, log, _) = engine_with(CacheConfig::strong());

        engine.put_info("k".to_string(), ValueInfo::null());

        assert_eq!(engine.get(&"k".to_string()), None);
        assert_eq!(engine.get_nullable(&"k".to_string()), Some(None));
        assert!(engine.contains(&"k".to_string()));

        engine.remove(&"k".to_string());
        assert_eq!(engine.get_nullable(&"k".to_string()), None);
        assert_eq!(events(&log), vec![("k".to_string(), None, RemovalCause::Explicit)]);
    }

    /// Validates TTL behavior for the default-duration expiry scenario.
    ///
    /// Assertions:
    /// - Confirms the value reads back before the TTL.
    /// - Confirms reads after the TTL report absent and notify `Expired`
    ///   exactly once.
    #[test]
    fn test_default_ttl_expiry() {
        let (engine, log, clock) = engine_with(CacheConfig::ttl(Duration::from_millis(50)));

        engine.put("a".to_string(), 1);
        assert_eq!(engine.get(&"a".to_string()), Some(1));

        clock.advance(Duration::from_millis(60));

        assert_eq!(engine.get(&"a".to_string()), None);
        assert_eq!(engine.get(&"a".to_string()), None);
        assert_eq!(engine.len(), 0);
        assert_eq!(events(&log), vec![("a".to_string(), Some(1), RemovalCause::Expired)]);
    }

    /// Validates TTL behavior for the per-entry override scenario.
    ///
    /// Assertions:
    /// - Confirms the override outlives the default TTL.
    #[test]
    fn test_per_entry_ttl_override() {
        let (engine, _, clock) = engine_with(CacheConfig::ttl(Duration::from_millis(50)));

        engine.put_info(
            "long".to_string(),
            ValueInfo::new(1).with_ttl(Duration::from_millis(500)),
        );
        engine.put("short".to_string(), 2);

        clock.advance(Duration::from_millis(100));
        assert_eq!(engine.get(&"long".to_string()), Some(1));
        assert_eq!(engine.get(&"short".to_string()), None);
    }

    /// Validates `Engine::expire` behavior for the extension scenario.
    ///
    /// Assertions:
    /// - Confirms extending a live entry keeps it readable past the old
    ///   deadline.
    /// - Confirms `expire` never creates an entry.
    #[test]
    fn test_expire_extends_live_entry() {
        let (engine, _, clock) = engine_with(CacheConfig::ttl(Duration::from_millis(50)));

        engine.put("k".to_string(), 1);
        assert!(engine.expire(&"k".to_string(), Duration::from_millis(500)));

        clock.advance(Duration::from_millis(100));
        assert_eq!(engine.get(&"k".to_string()), Some(1));

        assert!(!engine.expire(&"missing".to_string(), Duration::from_millis(500)));
        assert_eq!(engine.get(&"missing".to_string()), None);
    }

    /// Validates `Engine::contains` behavior for the lazy expiration
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms `contains` reports false after the TTL and removes the
    ///   entry with an `Expired` notification.
    #[test]
    fn test_contains_lazily_expires() {
        let (engine, log, clock) = engine_with(CacheConfig::ttl(Duration::from_millis(50)));

        engine.put("k".to_string(), 1);
        assert!(engine.contains(&"k".to_string()));

        clock.advance(Duration::from_millis(60));
        assert!(!engine.contains(&"k".to_string()));
        assert_eq!(engine.len(), 0);
        assert_eq!(events(&log), vec![("k".to_string(), Some(1), RemovalCause::Expired)]);
    }

    /// Validates replacing an expired entry reports `Expired`, not
    /// `Replaced`.
    ///
    /// Assertions:
    /// - Confirms the single notification for the old value has cause
    ///   `Expired`.
    #[test]
    fn test_put_over_expired_reports_expired() {
        let (engine, log, clock) = engine_with(CacheConfig::ttl(Duration::from_millis(50)));

        engine.put("k".to_string(), 1);
        clock.advance(Duration::from_millis(60));
        engine.put("k".to_string(), 2);

        assert_eq!(engine.get(&"k".to_string()), Some(2));
        assert_eq!(events(&log), vec![("k".to_string(), Some(1), RemovalCause::Expired)]);
    }

    /// Validates `Engine::get_or_compute` behavior for the producer
    /// invocation scenario.
    ///
    /// Assertions:
    /// - Confirms the producer runs once for an absent key and not at all
    ///   for a live one.
    #[test]
    fn test_get_or_compute_runs_producer_once() {
        let (engine, _, _) = engine_with(CacheConfig::strong());
        let mut calls = 0;

        let first = engine.get_or_compute("k".to_string(), |_| {
            calls += 1;
            42
        });
        assert_eq!(first, Some(42));
        assert_eq!(calls, 1);

        let second = engine.get_or_compute("k".to_string(), |_| {
            calls += 1;
            99
        });
        assert_eq!(second, Some(42));
        assert_eq!(calls, 1);
    }

    /// Validates `Engine::get_or_compute` behavior for the cached-null
    /// short circuit scenario.
    ///
    /// Assertions:
    /// - Confirms a live cached null is returned without producing.
    #[test]
    fn test_get_or_compute_respects_cached_null() {
        let (engine, _, _) = engine_with(CacheConfig::strong());

        engine.put_info("k".to_string(), ValueInfo::null());

        let mut calls = 0;
        let result = engine.get_or_compute("k".to_string(), |_| {
            calls += 1;
            1
        });
        assert_eq!(result, None);
        assert_eq!(calls, 0);
    }

    /// Validates `Engine::get_or_compute_nullable` behavior for the
    /// do-not-cache scenario.
    ///
    /// Assertions:
    /// - Confirms a declining producer installs nothing and notifies
    ///   nothing.
    #[test]
    fn test_compute_nullable_decline() {
        let (engine, log, _) = engine_with(CacheConfig::strong());

        let result = engine.get_or_compute_nullable("k".to_string(), |_| None);
        assert_eq!(result, None);
        assert_eq!(engine.len(), 0);
        assert!(events(&log).is_empty());

        // A producer that does cache, with a null payload
        let result = engine.get_or_compute_nullable("k".to_string(), |_| Some(ValueInfo::null()));
        assert_eq!(result, Some(None));
        assert_eq!(engine.get_nullable(&"k".to_string()), Some(None));
    }

    /// Validates `Engine::clear` behavior for the explicit clear scenario.
    ///
    /// Assertions:
    /// - Confirms every live entry is reported `Explicit` exactly once.
    #[test]
    fn test_clear_notifies_each_entry() {
        let (engine, log, _) = engine_with(CacheConfig::strong());

        engine.put("a".to_string(), 1);
        engine.put("b".to_string(), 2);
        engine.clear();

        assert_eq!(engine.len(), 0);
        let mut seen = events(&log);
        seen.sort_by(|left, right| left.0.cmp(&right.0));
        assert_eq!(
            seen,
            vec![
                ("a".to_string(), Some(1), RemovalCause::Explicit),
                ("b".to_string(), Some(2), RemovalCause::Explicit),
            ]
        );
    }

    /// Validates phantom-mode behavior for the notification-only scenario.
    ///
    /// Assertions:
    /// - Confirms a phantom entry never reads back.
    /// - Confirms the first operation after installation collects it with
    ///   a `Collected` notification carrying no value.
    #[test]
    fn test_phantom_collects_on_next_access() {
        let (engine, log, _) = engine_with(CacheConfig::phantom());

        engine.put("k".to_string(), 1);
        assert!(events(&log).is_empty());

        // The next public operation drains the queue
        assert_eq!(engine.get(&"k".to_string()), None);
        assert_eq!(engine.len(), 0);
        assert_eq!(events(&log), vec![("k".to_string(), None, RemovalCause::Collected)]);

        // Nothing left for later cleans
        engine.clean();
        assert_eq!(events(&log).len(), 1);
    }

    /// Validates weak-mode behavior for the two-epoch sweep scenario.
    ///
    /// Assertions:
    /// - Confirms an untouched entry survives one clean and is collected
    ///   by the second, carrying its captured value.
    /// - Confirms a touched entry survives both.
    #[test]
    fn test_weak_sweep_collects_untouched() {
        let (engine, log, _) = engine_with(CacheConfig::weak());

        engine.put("stale".to_string(), 1);
        engine.put("busy".to_string(), 2);

        engine.clean();
        assert_eq!(engine.len(), 2);
        assert!(events(&log).is_empty());

        // Touch only "busy" during the new epoch
        assert_eq!(engine.get(&"busy".to_string()), Some(2));

        engine.clean();
        assert_eq!(engine.len(), 1);
        assert_eq!(engine.get(&"stale".to_string()), None);
        assert_eq!(events(&log), vec![("stale".to_string(), Some(1), RemovalCause::Collected)]);

        // Left untouched, the survivor goes on a later sweep
        engine.clean();
        engine.clean();
        assert_eq!(engine.len(), 0);
        assert_eq!(
            events(&log),
            vec![
                ("stale".to_string(), Some(1), RemovalCause::Collected),
                ("busy".to_string(), Some(2), RemovalCause::Collected),
            ]
        );
    }

    /// Validates soft-mode behavior for the watermark pressure scenario.
    ///
    /// Assertions:
    /// - Confirms inserts above the watermark collect the least recently
    ///   touched entries down to the watermark.
    #[test]
    fn test_soft_pressure_collects_lru() {
        let (engine, log, clock) = engine_with(CacheConfig::soft(2));

        engine.put("a".to_string(), 1);
        clock.advance(Duration::from_millis(10));
        engine.put("b".to_string(), 2);
        clock.advance(Duration::from_millis(10));

        // Touch "a" so "b" becomes the eviction candidate
        assert_eq!(engine.get(&"a".to_string()), Some(1));
        clock.advance(Duration::from_millis(10));

        engine.put("c".to_string(), 3);

        assert_eq!(engine.len(), 2);
        assert_eq!(engine.get(&"b".to_string()), None);
        assert_eq!(engine.get(&"a".to_string()), Some(1));
        assert_eq!(engine.get(&"c".to_string()), Some(3));
        assert_eq!(events(&log), vec![("b".to_string(), Some(2), RemovalCause::Collected)]);
    }

    /// Validates `Engine::stats` behavior for the metrics accounting
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms hits, misses, inserts and per-cause removal counters.
    #[test]
    fn test_stats_tracking() {
        let config = CacheConfig::builder().track_metrics(true).build();
        let (engine, _, _) = engine_with(config);

        engine.put("a".to_string(), 1);
        engine.put("a".to_string(), 2);
        let _ = engine.get(&"a".to_string());
        let _ = engine.get(&"missing".to_string());
        engine.remove(&"a".to_string());

        let stats = engine.stats();
        assert_eq!(stats.size, 0);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.inserts, 2);
        assert_eq!(stats.replacements, 1);
        assert_eq!(stats.explicit_removals, 1);
        assert!(stats.watermark.is_none());
    }
}
