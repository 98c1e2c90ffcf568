//! # signal-bus
//!
//! Client-side signal bus layered over a persistent duplex WebSocket
//! connection. Application code works with two primitives: named
//! publish/subscribe *signals* that can originate locally or be pushed by
//! the remote peer, and *remote calls* whose replies resolve a pending
//! result handle.
//!
//! ## Architecture
//!
//! ```text
//! Application code
//!     │
//!     ├── SignalBus (bus)             subscribe · dispatch · relay · invoke
//!     │
//!     ├── SignalRegistry (signal/)    ordered subscriber lists
//!     ├── DedupGuard (signal/)        at-most-once delivery per signal id
//!     ├── CallCorrelator (rpc/)       call id → pending result handle
//!     │
//!     ├── route (wire/)               inbound frame shape dispatch
//!     ├── OutboundBuffer (conn/)      FIFO queue while disconnected
//!     └── Link + manager (conn/)      socket lifecycle, heartbeat, reconnect
//! ```
//!
//! The connection manager reconnects forever with a configurable delay;
//! connectivity loss is never surfaced as an application error, only as a
//! pause in remote traffic until the link is `Open` again.

pub mod bus;
pub mod config;
pub mod conn;
pub mod error;
pub mod rpc;
pub mod signal;
pub mod wire;

pub use bus::SignalBus;
pub use config::BusConfig;
pub use error::{BusError, CallError};
