//! Wire layer: frame types and inbound routing.
//!
//! Frames are newline-free JSON text messages over the WebSocket. The
//! heartbeat sentinel is handled a layer below (echoed by the connection
//! pump, never parsed); every other inbound frame is matched against the
//! recognized shapes by [`route`] and dropped silently when none fits.

pub mod frames;
pub mod router;

pub use frames::{CallFrame, InboundFrame, SignalFrame};
pub use router::route;
