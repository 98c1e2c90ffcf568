//! Connection layer: outbound buffering, link state, socket lifecycle.
//!
//! The [`Link`] is the shared view of the connection: its state, the writer
//! handle to the live socket (when `Open`), and the [`OutboundBuffer`] that
//! absorbs signal frames while disconnected. The manager task owns the
//! socket itself: it dials, pumps frames, echoes heartbeats, and reconnects
//! forever with a configurable delay.

pub mod buffer;
pub mod link;
pub(crate) mod manager;

pub use buffer::OutboundBuffer;
pub use link::{Link, LinkEvent, LinkState};
