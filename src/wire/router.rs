//! Inbound frame routing.

use crate::error::CallError;
use crate::rpc::CallCorrelator;
use crate::signal::{DedupGuard, SignalRegistry};

use super::InboundFrame;

/// Routes one inbound non-heartbeat frame.
///
/// Broadcasts go to the signal registry (through the dedup guard), replies
/// settle or fail the matching correlator entry. Frames matching none of the
/// recognized shapes are dropped with a debug log; a malformed frame is not
/// an error.
pub fn route(raw: &str, registry: &SignalRegistry, dedup: &DedupGuard, correlator: &CallCorrelator) {
    match serde_json::from_str::<InboundFrame>(raw) {
        Ok(InboundFrame::Broadcast {
            signal,
            signal_id,
            opts,
        }) => {
            tracing::debug!(signal = %signal, delivery_id = %signal_id, "broadcast received");
            registry.dispatch(&signal, &opts, Some(&signal_id), dedup);
        }
        Ok(InboundFrame::Failure {
            result_id,
            exception,
        }) => {
            correlator.fail(&result_id, CallError::Remote(exception));
        }
        Ok(InboundFrame::Success { result_id, result }) => {
            correlator.settle(&result_id, result);
        }
        Err(err) => {
            tracing::debug!(error = %err, "dropping unrecognized frame");
        }
    }
}
