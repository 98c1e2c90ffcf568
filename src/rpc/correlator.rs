//! Call-id correlation table.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use serde_json::Value;
use tokio::sync::oneshot;

use crate::error::CallError;

use super::pending::{PendingCall, Settlement};

/// Maps outstanding remote-call ids to their pending result handles.
///
/// An entry is created atomically with the outbound send and destroyed on
/// settlement; exactly one of [`settle`](Self::settle) / [`fail`](Self::fail)
/// applies per id, later attempts for the same id are no-ops. A reply for an
/// id the correlator no longer tracks (e.g. a very late reply after a
/// timeout) is dropped silently.
#[derive(Debug, Default)]
pub struct CallCorrelator {
    pending: Mutex<HashMap<String, oneshot::Sender<Settlement>>>,
}

impl CallCorrelator {
    /// Creates an empty correlator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pending entry for `call_id` and returns the caller's handle.
    ///
    /// Reusing a live call id replaces the old entry, which then settles as
    /// [`CallError::Abandoned`]; the monotonic id counter makes this
    /// unreachable in normal operation.
    #[must_use]
    pub fn register(&self, call_id: &str) -> PendingCall {
        let (tx, rx) = oneshot::channel();
        self.lock().insert(call_id.to_string(), tx);
        PendingCall::new(rx)
    }

    /// Resolves the pending entry for `call_id` with `result`.
    ///
    /// No-op if the id is unknown.
    pub fn settle(&self, call_id: &str, result: Value) {
        self.finish(call_id, Ok(result));
    }

    /// Rejects the pending entry for `call_id` with `error`.
    ///
    /// No-op if the id is unknown.
    pub fn fail(&self, call_id: &str, error: CallError) {
        self.finish(call_id, Err(error));
    }

    /// Number of calls still awaiting a reply.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.lock().len()
    }

    fn finish(&self, call_id: &str, settlement: Settlement) {
        let entry = self.lock().remove(call_id);
        match entry {
            // Send fails only if the caller dropped the handle; nothing to do.
            Some(sender) => {
                let _ = sender.send(settlement);
            }
            None => {
                tracing::debug!(call_id, "reply for unknown call id dropped");
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, oneshot::Sender<Settlement>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
