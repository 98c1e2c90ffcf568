//! Pending result handle for an outstanding remote call.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use serde_json::Value;
use tokio::sync::oneshot;

use crate::error::CallError;

/// Outcome delivered to a pending call: the reply payload on success, a
/// [`CallError`] on failure.
pub type Settlement = Result<Value, CallError>;

/// The caller's half of an outstanding remote call.
///
/// Resolves exactly once, when the matching reply frame arrives (or the call
/// is failed locally: not connected, timed out). Await it to obtain the
/// settlement:
///
/// ```no_run
/// # async fn demo(bus: signal_bus::SignalBus) -> Result<(), signal_bus::CallError> {
/// let sum = bus.invoke_remote("add", serde_json::json!({"a": 2, "b": 3})).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PendingCall {
    receiver: oneshot::Receiver<Settlement>,
}

impl PendingCall {
    pub(crate) fn new(receiver: oneshot::Receiver<Settlement>) -> Self {
        Self { receiver }
    }
}

impl Future for PendingCall {
    type Output = Settlement;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.get_mut().receiver).poll(cx) {
            Poll::Ready(Ok(settlement)) => Poll::Ready(settlement),
            Poll::Ready(Err(_)) => Poll::Ready(Err(CallError::Abandoned)),
            Poll::Pending => Poll::Pending,
        }
    }
}
