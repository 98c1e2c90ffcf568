//! Ordered subscriber lists keyed by signal name.

use std::collections::HashMap;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;

use super::{DedupGuard, DeliveryId, SignalHandler};

/// Maps signal names to ordered lists of subscribers.
///
/// Registration order is dispatch order. The registry performs no duplicate
/// detection: subscribing the same handler twice runs it twice. Handler
/// lists are cloned out of the lock before invocation, so a handler may
/// re-enter [`subscribe`](Self::subscribe) or
/// [`dispatch`](Self::dispatch) without deadlocking.
#[derive(Default)]
pub struct SignalRegistry {
    handlers: Mutex<HashMap<String, Vec<Arc<dyn SignalHandler>>>>,
}

impl SignalRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `handler` to the subscriber list for `signal`, creating the
    /// list if absent.
    pub fn subscribe(&self, signal: impl Into<String>, handler: Arc<dyn SignalHandler>) {
        let mut map = self.lock();
        map.entry(signal.into()).or_default().push(handler);
    }

    /// Dispatches one broadcast of `signal` to its subscribers in
    /// registration order.
    ///
    /// No subscriber list means a silent no-op, and the delivery id is then
    /// *not* marked seen (a later subscription still receives a re-delivery
    /// of the same id). With subscribers present, a `Some` delivery id
    /// consults `dedup` first: already-seen ids are dropped, fresh ids are
    /// marked and delivered. A `None` id skips deduplication entirely, so
    /// every locally-raised dispatch runs.
    ///
    /// Subscriber failures are isolated: a panicking handler is logged and
    /// the remaining subscribers still run.
    pub fn dispatch(
        &self,
        signal: &str,
        opts: &Value,
        delivery_id: Option<&DeliveryId>,
        dedup: &DedupGuard,
    ) {
        let subscribers = {
            let map = self.lock();
            match map.get(signal) {
                Some(list) => list.clone(),
                None => return,
            }
        };

        if let Some(id) = delivery_id
            && !dedup.check_and_mark(id)
        {
            tracing::debug!(signal, delivery_id = %id, "duplicate delivery suppressed");
            return;
        }

        for handler in &subscribers {
            let outcome =
                std::panic::catch_unwind(AssertUnwindSafe(|| handler.invoke(opts, delivery_id.cloned())));
            if outcome.is_err() {
                tracing::error!(signal, "subscriber panicked during dispatch");
            }
        }
    }

    /// Number of subscribers currently registered for `signal`.
    #[must_use]
    pub fn subscriber_count(&self, signal: &str) -> usize {
        self.lock().get(signal).map_or(0, Vec::len)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<Arc<dyn SignalHandler>>>> {
        self.handlers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for SignalRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let map = self.lock();
        let mut entries = f.debug_map();
        for (signal, list) in map.iter() {
            entries.key(signal).value(&list.len());
        }
        entries.finish()
    }
}
