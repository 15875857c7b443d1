//! The drain queue
//!
//! A single queue shared by all reclaimable cells of one cache instance.
//! The reclamation sweep (and phantom installation) pushes `(key, cell)`
//! pairs onto it; the engine polls it non-blockingly at the start of every
//! public operation and during [`Cache::clean`], which bounds the number of
//! severed-but-still-mapped entries without a background thread.
//!
//! Pushing is multi-producer and popping is safe under concurrent drains:
//! each cell is popped exactly once, and the cell's own invalidation state
//! keeps the subsequent notification exactly-once even if a popped cell
//! races another removal path.
//!
//! [`Cache::clean`]: crate::Cache::clean

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::entry::Cell;

#[derive(Debug)]
pub(crate) struct DrainQueue<K, V> {
    pending: Mutex<VecDeque<(K, Arc<Cell<V>>)>>,
}

impl<K, V> DrainQueue<K, V> {
    pub(crate) fn new() -> Self {
        Self { pending: Mutex::new(VecDeque::new()) }
    }

    /// Enqueue a cell for finalization
    pub(crate) fn push(&self, key: K, cell: Arc<Cell<V>>) {
        self.pending.lock().push_back((key, cell));
    }

    /// Pop the oldest pending cell, if any
    ///
    /// Non-blocking; the lock is released before the caller touches the
    /// map, so drain work never holds the queue and a map shard at once.
    pub(crate) fn pop(&self) -> Option<(K, Arc<Cell<V>>)> {
        self.pending.lock().pop_front()
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.lock().len()
    }
}
