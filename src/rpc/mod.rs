//! Remote-call layer: call-id correlation and pending result handles.
//!
//! Every remote call gets a session-unique id (`"f1"`, `"f2"`, …). The
//! [`CallCorrelator`] keeps one pending entry per outstanding id and settles
//! it exactly once when a matching reply frame arrives; the caller holds the
//! other end as a [`PendingCall`] future.

pub mod correlator;
pub mod pending;

pub use correlator::CallCorrelator;
pub use pending::PendingCall;
