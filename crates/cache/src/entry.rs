//! The per-key storage cell
//!
//! A [`Cell`] holds one cached association: the value slot (with null
//! masking), the absolute expiration timestamp, access bookkeeping for the
//! reclamation policy, and the removal state. The concurrent map is the
//! single source of truth for which cell is live for a key; a cell records
//! its winning removal cause at most once, which is what gives the
//! exactly-once listener guarantee.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::listener::RemovalCause;

/// Expiration timestamp meaning "never expires"
pub(crate) const NEVER: u64 = 0;

/// The value slot of a cell
///
/// `Null` is the sentinel for a cached absent value, so "slot reclaimed"
/// (`Cleared`) stays distinguishable from "cached nothing on purpose".
#[derive(Debug)]
pub(crate) enum Slot<V> {
    /// A present cached value
    Value(V),
    /// A cached absent value (the key is mapped, reads report absent)
    Null,
    /// A notification-only tombstone; never yields a value
    Phantom,
    /// The value was reclaimed or moved out at invalidation
    Cleared,
}

/// Mutable removal state of a cell, guarded by the cell mutex
#[derive(Debug)]
struct CellState<V> {
    slot: Slot<V>,
    /// Winning removal cause; set at most once
    cause: Option<RemovalCause>,
    /// Value snapshot taken when the slot was cleared before notification
    captured: Option<V>,
}

/// One cached association
///
/// Created when a key is populated, mutated only by expiration extension
/// and invalidation, and destroyed when it leaves the map. The `id` is the
/// identity used for compare-and-remove against the map, guarding lazy
/// expiration and drains against concurrent replacement.
#[derive(Debug)]
pub(crate) struct Cell<V> {
    id: u64,
    /// Absolute milliseconds since the UNIX epoch; `NEVER` = no expiry
    expires_at: AtomicU64,
    /// Sweep epoch of the last access (weak reclamation)
    touched_epoch: AtomicU64,
    /// Absolute milliseconds of the last access (soft reclamation)
    touched_at: AtomicU64,
    state: Mutex<CellState<V>>,
}

impl<V> Cell<V> {
    pub(crate) fn new(id: u64, slot: Slot<V>, expires_at: u64, epoch: u64, now_ms: u64) -> Self {
        Self {
            id,
            expires_at: AtomicU64::new(expires_at),
            touched_epoch: AtomicU64::new(epoch),
            touched_at: AtomicU64::new(now_ms),
            state: Mutex::new(CellState { slot, cause: None, captured: None }),
        }
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn is_expired(&self, now_ms: u64) -> bool {
        let expires_at = self.expires_at.load(Ordering::Acquire);
        expires_at != NEVER && now_ms >= expires_at
    }

    /// Reset the expiration timestamp (absolute milliseconds)
    pub(crate) fn set_expires_at(&self, expires_at: u64) {
        self.expires_at.store(expires_at, Ordering::Release);
    }

    /// Record an access for the reclamation policy
    pub(crate) fn touch(&self, epoch: u64, now_ms: u64) {
        self.touched_epoch.store(epoch, Ordering::Relaxed);
        self.touched_at.store(now_ms, Ordering::Relaxed);
    }

    pub(crate) fn touched_epoch(&self) -> u64 {
        self.touched_epoch.load(Ordering::Relaxed)
    }

    pub(crate) fn touched_at(&self) -> u64 {
        self.touched_at.load(Ordering::Relaxed)
    }

    /// True while the raw slot still holds something readable
    ///
    /// Cached null counts as readable; phantom tombstones and reclaimed
    /// slots do not.
    pub(crate) fn has_value(&self) -> bool {
        matches!(self.state.lock().slot, Slot::Value(_) | Slot::Null)
    }

    /// True once the cell belongs to the drain queue
    ///
    /// Phantom cells are enqueued at install time and severed cells at
    /// sweep time; either way the queue, not the caller, finalizes them.
    pub(crate) fn is_pending_reclaim(&self) -> bool {
        let state = self.state.lock();
        state.cause.is_none() && matches!(state.slot, Slot::Phantom | Slot::Cleared)
    }

    /// Record the winning removal cause and surrender the value
    ///
    /// The first call wins and returns `Some` with the value the cell held
    /// at invalidation time (captured earlier if the slot was already
    /// severed); later calls return `None` and have no effect. The caller
    /// that wins is the one that must notify the listener.
    pub(crate) fn invalidate(&self, cause: RemovalCause) -> Option<Option<V>> {
        let mut state = self.state.lock();
        if state.cause.is_some() {
            return None;
        }
        state.cause = Some(cause);
        let value = match std::mem::replace(&mut state.slot, Slot::Cleared) {
            Slot::Value(value) => Some(value),
            Slot::Cleared => state.captured.take(),
            Slot::Null | Slot::Phantom => None,
        };
        Some(value)
    }

    /// Sever the value slot ahead of collection
    ///
    /// Moves the value into the captured snapshot and clears the slot so
    /// reads see the entry as absent while it waits in the drain queue.
    /// Returns false if the cell was already severed, a phantom, or
    /// invalidated, in which case it must not be enqueued again.
    pub(crate) fn sever(&self) -> bool {
        let mut state = self.state.lock();
        if state.cause.is_some() {
            return false;
        }
        match std::mem::replace(&mut state.slot, Slot::Cleared) {
            Slot::Value(value) => {
                state.captured = Some(value);
                true
            }
            Slot::Null => true,
            slot @ (Slot::Phantom | Slot::Cleared) => {
                state.slot = slot;
                false
            }
        }
    }
}

impl<V: Clone> Cell<V> {
    /// Read the slot, unmasking the null sentinel
    ///
    /// Outer `None` means the slot holds nothing usable (phantom or
    /// reclaimed); `Some(None)` is a cached absent value.
    pub(crate) fn value(&self) -> Option<Option<V>> {
        match &self.state.lock().slot {
            Slot::Value(value) => Some(Some(value.clone())),
            Slot::Null => Some(None),
            Slot::Phantom | Slot::Cleared => None,
        }
    }
}
