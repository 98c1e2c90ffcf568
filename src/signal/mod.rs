//! Signal layer: subscriber registry, delivery identity, deduplication.
//!
//! A *signal* is a named event broadcast to zero or more local subscribers.
//! Remotely-originated broadcasts carry a [`DeliveryId`] tagging that one
//! broadcast instance; the [`DedupGuard`] ensures each id is dispatched at
//! most once per session. Locally-raised signals carry no id and are never
//! deduplicated.

pub mod dedup;
pub mod delivery;
pub mod handler;
pub mod registry;

pub use dedup::DedupGuard;
pub use delivery::DeliveryId;
pub use handler::SignalHandler;
pub use registry::SignalRegistry;
