//! Bus error types.
//!
//! Failures split into two families: [`BusError`] for bus-level operations
//! (sending, configuration) and [`CallError`] for the settlement of a pending
//! remote call. Transport failures are deliberately absent from both: a lost
//! connection is recovered by the automatic reconnect loop and never surfaces
//! as an application error.

use serde_json::Value;

/// Bus-level error.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    /// The operation requires an `Open` connection and the link is not open.
    ///
    /// Only remote-call frames hit this: signal frames are buffered while
    /// disconnected, call frames are not.
    #[error("connection is not open")]
    NotConnected,
}

/// Failure settlement of a pending remote call.
#[derive(Debug, thiserror::Error)]
pub enum CallError {
    /// The remote peer replied with an exception payload.
    #[error("remote call failed: {0}")]
    Remote(Value),

    /// The call was issued while the connection was not open.
    ///
    /// Call frames bypass the outbound buffer, so this rejects the pending
    /// handle immediately instead of letting it hang.
    #[error("remote call issued while the connection is not open")]
    NotConnected,

    /// No reply arrived within the configured per-call timeout.
    #[error("remote call timed out")]
    Timeout,

    /// The correlation entry disappeared without a settlement.
    ///
    /// Only reachable if a second `register` reuses a live call id, which the
    /// monotonic counter rules out in normal operation.
    #[error("pending call abandoned before settlement")]
    Abandoned,
}

impl CallError {
    /// Returns the remote exception payload, if this is a [`CallError::Remote`].
    #[must_use]
    pub fn remote_payload(&self) -> Option<&Value> {
        match self {
            Self::Remote(payload) => Some(payload),
            _ => None,
        }
    }
}
