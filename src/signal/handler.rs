//! Subscriber capability trait.

use serde_json::Value;

use super::DeliveryId;

/// A signal subscriber.
///
/// The single capability is [`invoke`](Self::invoke): receive the signal's
/// options payload and, for remotely-originated broadcasts, the delivery id.
/// Return values are ignored by dispatch. Implemented for any matching
/// closure, so plain `Fn`s subscribe directly:
///
/// ```
/// use signal_bus::SignalBus;
/// use signal_bus::signal::DeliveryId;
///
/// let bus = SignalBus::default();
/// bus.subscribe("notification", |opts: &serde_json::Value, _id: Option<DeliveryId>| {
///     tracing::info!(payload = %opts, "notification");
/// });
/// ```
pub trait SignalHandler: Send + Sync {
    /// Handles one dispatch of the subscribed signal.
    ///
    /// `delivery_id` is `Some` iff the signal originated from the remote
    /// peer; locally-raised signals pass `None`.
    fn invoke(&self, opts: &Value, delivery_id: Option<DeliveryId>);
}

impl<F> SignalHandler for F
where
    F: Fn(&Value, Option<DeliveryId>) + Send + Sync,
{
    fn invoke(&self, opts: &Value, delivery_id: Option<DeliveryId>) {
        self(opts, delivery_id);
    }
}
