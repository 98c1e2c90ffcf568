//! Duplicate-delivery suppression for remotely-originated signals.

use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, PoisonError};

use super::DeliveryId;

/// Tracks which delivery ids have already been dispatched.
///
/// A broadcast may be delivered more than once (e.g. echoed by the peer);
/// the guard ensures each delivery id triggers subscribers at most once per
/// session. The set is bounded: once `capacity` ids are remembered, the
/// oldest is evicted first. A capacity of `0` disables eviction, restoring
/// the unbounded grow-forever behavior.
#[derive(Debug)]
pub struct DedupGuard {
    inner: Mutex<DedupInner>,
}

#[derive(Debug)]
struct DedupInner {
    seen: HashSet<DeliveryId>,
    order: VecDeque<DeliveryId>,
    capacity: usize,
}

impl DedupGuard {
    /// Creates a guard remembering at most `capacity` ids (`0` = unbounded).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(DedupInner {
                seen: HashSet::new(),
                order: VecDeque::new(),
                capacity,
            }),
        }
    }

    /// Returns `true` iff `id` has previously been marked.
    #[must_use]
    pub fn seen(&self, id: &DeliveryId) -> bool {
        self.lock().seen.contains(id)
    }

    /// Records `id` as seen, evicting the oldest id when over capacity.
    pub fn mark(&self, id: &DeliveryId) {
        let mut inner = self.lock();
        inner.insert(id);
    }

    /// Atomically checks and marks `id`.
    ///
    /// Returns `true` iff `id` was not seen before this call (i.e. the
    /// caller holds the one dispatch permit for it).
    pub fn check_and_mark(&self, id: &DeliveryId) -> bool {
        let mut inner = self.lock();
        if inner.seen.contains(id) {
            return false;
        }
        inner.insert(id);
        true
    }

    /// Number of ids currently remembered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().seen.len()
    }

    /// Returns `true` if no id has been marked yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DedupInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DedupInner {
    fn insert(&mut self, id: &DeliveryId) {
        if !self.seen.insert(id.clone()) {
            return;
        }
        self.order.push_back(id.clone());
        if self.capacity > 0 {
            while self.order.len() > self.capacity {
                if let Some(oldest) = self.order.pop_front() {
                    self.seen.remove(&oldest);
                }
            }
        }
    }
}
