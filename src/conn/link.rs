//! Shared connection state and the send seams.

use std::sync::{Mutex, PoisonError};

use tokio::sync::{broadcast, mpsc};
use tokio_tungstenite::tungstenite::Message;

use crate::error::BusError;

use super::OutboundBuffer;

/// Connection lifecycle state.
///
/// Cycles `Closed → Connecting → Open → Closed → …` indefinitely; there is
/// no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// No socket; a reconnect is scheduled (or `start` was never called).
    Closed,
    /// A connect attempt is in flight.
    Connecting,
    /// The socket is live; frames are written directly.
    Open,
}

/// Observable link transition, published on a broadcast channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    /// The link reached `Open` (and the outbound buffer was flushed).
    Connected,
    /// An `Open` link was lost; a reconnect will follow.
    Disconnected,
}

/// Shared view of the managed connection.
///
/// Owned by the bus context and shared with the manager task. All writes to
/// the socket funnel through here: while `Open` an installed mpsc writer
/// forwards to the socket pump, otherwise signal frames land in the
/// [`OutboundBuffer`] and call frames fail fast.
#[derive(Debug)]
pub struct Link {
    shared: Mutex<LinkShared>,
    events: broadcast::Sender<LinkEvent>,
}

#[derive(Debug)]
struct LinkShared {
    state: LinkState,
    writer: Option<mpsc::UnboundedSender<Message>>,
    buffer: OutboundBuffer,
}

impl Default for Link {
    fn default() -> Self {
        Self::new()
    }
}

impl Link {
    /// Creates a closed link with an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            shared: Mutex::new(LinkShared {
                state: LinkState::Closed,
                writer: None,
                buffer: OutboundBuffer::new(),
            }),
            events,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> LinkState {
        self.lock().state
    }

    /// Subscribes to link transitions.
    ///
    /// Only transitions after this call are observed; the channel drops the
    /// oldest events for lagging receivers.
    #[must_use]
    pub fn events(&self) -> broadcast::Receiver<LinkEvent> {
        self.events.subscribe()
    }

    /// Number of signal frames waiting for the next flush.
    #[must_use]
    pub fn buffered_len(&self) -> usize {
        self.lock().buffer.len()
    }

    /// Sends a signal frame: written directly while `Open`, buffered
    /// otherwise.
    pub fn send_signal(&self, frame: String) {
        let mut shared = self.lock();
        if let Some(writer) = shared.writer.as_ref().filter(|w| !w.is_closed()) {
            // A send error here means the pump dropped its receiver in the
            // instant after the check; the frame raced the close and is lost
            // exactly as it would have been on the socket itself.
            let _ = writer.send(Message::text(frame));
            return;
        }
        shared.buffer.enqueue(frame);
    }

    /// Sends a call frame, which never enters the buffer.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::NotConnected`] when the link is not `Open`, so
    /// the caller can reject the pending call immediately instead of letting
    /// it hang.
    pub fn send_call(&self, frame: String) -> Result<(), BusError> {
        let shared = self.lock();
        match shared.writer.as_ref().filter(|w| !w.is_closed()) {
            Some(writer) => writer
                .send(Message::text(frame))
                .map_err(|_| BusError::NotConnected),
            None => Err(BusError::NotConnected),
        }
    }

    /// Marks a connect attempt in flight.
    pub(crate) fn set_connecting(&self) {
        self.lock().state = LinkState::Connecting;
    }

    /// Transitions to `Open`: flushes the buffer through `writer`, installs
    /// it for direct sends, then publishes [`LinkEvent::Connected`].
    ///
    /// Flush and install happen under one lock, so frames enqueued
    /// concurrently are either part of this flush or sent directly through
    /// the installed writer.
    pub(crate) fn open(&self, writer: mpsc::UnboundedSender<Message>) {
        let flushed = {
            let mut shared = self.lock();
            shared.state = LinkState::Open;
            let flushed = shared.buffer.flush(|frame| writer.send(Message::text(frame)));
            shared.writer = Some(writer);
            flushed
        };
        match flushed {
            Ok(count) if count > 0 => tracing::debug!(frames = count, "outbound buffer flushed"),
            Ok(_) => {}
            Err(_) => tracing::warn!("connection writer closed during flush"),
        }
        let _ = self.events.send(LinkEvent::Connected);
    }

    /// Transitions to `Closed`, discarding the writer. Publishes
    /// [`LinkEvent::Disconnected`] only if the link was actually `Open`
    /// (a failed connect attempt closes silently).
    pub(crate) fn close(&self) {
        let was_open = {
            let mut shared = self.lock();
            let was_open = shared.state == LinkState::Open;
            shared.state = LinkState::Closed;
            shared.writer = None;
            was_open
        };
        if was_open {
            let _ = self.events.send(LinkEvent::Disconnected);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LinkShared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
