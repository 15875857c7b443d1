//! Reclamation strategy
//!
//! The policy decides how a cell's value becomes eligible for automatic
//! removal. Reference-queue semantics are remodeled as a cache-owned sweep:
//! instead of a garbage collector severing reachability asynchronously, the
//! sweep runs on calling threads ([`Cache::clean`] and, for soft caches,
//! opportunistically after inserts) and pushes severed cells onto the drain
//! queue, where the engine finalizes them with `Collected` notifications.
//!
//! Mode behavior:
//! - **Strong** wraps values by direct ownership and never sweeps.
//! - **Weak** severs every cell not touched since the previous sweep began
//!   (two-epoch not-recently-used), then advances the sweep epoch.
//! - **Soft** severs least-recently-touched cells, but only while the live
//!   count exceeds the watermark.
//! - **Phantom** wraps every value as a tombstone that never reads back and
//!   enqueues the cell at install time, so the first operation after
//!   installation collects it.
//!
//! [`Cache::clean`]: crate::Cache::clean

use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::config::ReclaimMode;
use crate::entry::{Cell, Slot};
use crate::queue::DrainQueue;

#[derive(Debug)]
pub(crate) struct ReclaimPolicy {
    mode: ReclaimMode,
    /// Soft-mode pressure threshold (live entries)
    watermark: usize,
    /// Current sweep epoch; cells record it on every access
    epoch: AtomicU64,
}

impl ReclaimPolicy {
    pub(crate) fn new(mode: ReclaimMode, watermark: usize) -> Self {
        Self { mode, watermark, epoch: AtomicU64::new(0) }
    }

    pub(crate) fn mode(&self) -> ReclaimMode {
        self.mode
    }

    pub(crate) fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Relaxed)
    }

    /// Wrap a produced value into the slot this mode stores
    pub(crate) fn wrap<V>(&self, value: Option<V>) -> Slot<V> {
        match self.mode {
            ReclaimMode::Phantom => Slot::Phantom,
            _ => match value {
                Some(value) => Slot::Value(value),
                None => Slot::Null,
            },
        }
    }

    /// Hook run right after a cell is installed in the map
    ///
    /// Phantom cells go straight onto the drain queue; their collection is
    /// the whole point of installing them.
    pub(crate) fn on_install<K, V>(&self, key: &K, cell: &Arc<Cell<V>>, queue: &DrainQueue<K, V>)
    where
        K: Clone,
    {
        if self.mode == ReclaimMode::Phantom {
            queue.push(key.clone(), Arc::clone(cell));
        }
    }

    /// True when an insert past `len` entries should trigger a sweep
    pub(crate) fn under_pressure(&self, len: usize) -> bool {
        self.mode == ReclaimMode::Soft && len > self.watermark
    }

    /// Sever reclaim-eligible cells into the drain queue
    ///
    /// Returns the number of cells severed. Severed cells stay mapped (and
    /// read as absent) until a drain finalizes them.
    pub(crate) fn sweep<K, V>(&self, map: &DashMap<K, Arc<Cell<V>>>, queue: &DrainQueue<K, V>) -> usize
    where
        K: Eq + Hash + Clone,
    {
        let severed = match self.mode {
            ReclaimMode::Strong | ReclaimMode::Phantom => 0,
            ReclaimMode::Weak => self.sweep_stale(map, queue),
            ReclaimMode::Soft => self.sweep_pressure(map, queue),
        };
        if severed > 0 {
            debug!(severed, mode = ?self.mode, "reclamation sweep severed entries");
        }
        severed
    }

    /// Weak mode: sever everything not touched since the previous sweep
    fn sweep_stale<K, V>(&self, map: &DashMap<K, Arc<Cell<V>>>, queue: &DrainQueue<K, V>) -> usize
    where
        K: Eq + Hash + Clone,
    {
        let current = self.epoch.load(Ordering::Relaxed);
        let mut severed = 0;
        for entry in map.iter() {
            let cell = entry.value();
            if cell.touched_epoch() < current && cell.sever() {
                queue.push(entry.key().clone(), Arc::clone(cell));
                severed += 1;
            }
        }
        self.epoch.fetch_add(1, Ordering::Relaxed);
        severed
    }

    /// Soft mode: sever least-recently-touched cells above the watermark
    fn sweep_pressure<K, V>(&self, map: &DashMap<K, Arc<Cell<V>>>, queue: &DrainQueue<K, V>) -> usize
    where
        K: Eq + Hash + Clone,
    {
        let len = map.len();
        if len <= self.watermark {
            return 0;
        }
        let excess = len - self.watermark;

        // Snapshot live candidates; severed and phantom cells are already
        // owned by the queue.
        let mut candidates: Vec<(u64, K, Arc<Cell<V>>)> = map
            .iter()
            .filter(|entry| entry.value().has_value())
            .map(|entry| (entry.value().touched_at(), entry.key().clone(), Arc::clone(entry.value())))
            .collect();
        candidates.sort_by_key(|(touched_at, _, _)| *touched_at);

        let mut severed = 0;
        for (_, key, cell) in candidates.into_iter().take(excess) {
            if cell.sever() {
                queue.push(key, cell);
                severed += 1;
            }
        }
        severed
    }
}
