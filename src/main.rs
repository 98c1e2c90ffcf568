//! signal-bus diagnostic client entry point.
//!
//! Connects to the configured WebSocket peer, logs every `notification`
//! broadcast, relays locally-raised `ping` signals, and keeps the managed
//! connection alive (reconnecting forever).

use tracing_subscriber::EnvFilter;

use signal_bus::SignalBus;
use signal_bus::config::BusConfig;
use signal_bus::signal::DeliveryId;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = BusConfig::from_env();
    tracing::info!(url = %config.url, "starting signal-bus client");

    // Build the bus and wire the demo signals
    let bus = SignalBus::new(config.clone());
    bus.subscribe(
        "notification",
        |opts: &serde_json::Value, id: Option<DeliveryId>| match id {
            Some(id) => tracing::info!(payload = %opts, delivery_id = %id, "notification"),
            None => tracing::info!(payload = %opts, "notification (local)"),
        },
    );
    bus.relay_signal("ping");

    // Open the managed connection; the supervision loop runs forever
    let connection = bus.start(config.url);
    connection.await?;

    Ok(())
}
