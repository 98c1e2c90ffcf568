//! The bus facade: one context object wiring every component together.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::config::BusConfig;
use crate::conn::{Link, LinkEvent, LinkState, manager};
use crate::error::CallError;
use crate::rpc::{CallCorrelator, PendingCall};
use crate::signal::{DedupGuard, DeliveryId, SignalHandler, SignalRegistry};
use crate::wire::{CallFrame, SignalFrame};

/// Everything the bus owns: registry, dedup set, correlator, link.
///
/// One instance per bus, shared by `Arc` between the application-facing
/// handle and the connection task. This is the explicit replacement for the
/// page-global singletons of the protocol's origin: single-instance
/// semantics without hidden global state.
#[derive(Debug)]
pub(crate) struct BusContext {
    pub(crate) config: BusConfig,
    pub(crate) registry: SignalRegistry,
    pub(crate) dedup: DedupGuard,
    pub(crate) correlator: CallCorrelator,
    pub(crate) link: Arc<Link>,
    call_counter: AtomicU64,
}

/// Client-side signal bus over one managed WebSocket connection.
///
/// Cheaply clonable handle; all clones share the same context. Construction
/// is synchronous and performs no I/O — nothing touches the network until
/// [`start`](Self::start).
///
/// ```no_run
/// use signal_bus::{BusConfig, SignalBus};
/// use signal_bus::signal::DeliveryId;
///
/// # async fn demo() {
/// let config = BusConfig::from_env();
/// let bus = SignalBus::new(config.clone());
///
/// bus.subscribe("notification", |opts: &serde_json::Value, _id: Option<DeliveryId>| {
///     tracing::info!(payload = %opts, "notification");
/// });
/// bus.relay_signal("page.refresh");
/// bus.start(config.url);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SignalBus {
    ctx: Arc<BusContext>,
}

impl Default for SignalBus {
    fn default() -> Self {
        Self::new(BusConfig::default())
    }
}

impl SignalBus {
    /// Creates a bus from `config`. No connection is opened yet.
    #[must_use]
    pub fn new(config: BusConfig) -> Self {
        let dedup = DedupGuard::new(config.dedup_capacity);
        Self {
            ctx: Arc::new(BusContext {
                config,
                registry: SignalRegistry::new(),
                dedup,
                correlator: CallCorrelator::new(),
                link: Arc::new(Link::new()),
                call_counter: AtomicU64::new(1),
            }),
        }
    }

    /// Registers `handler` for `signal`.
    ///
    /// Handlers fire in registration order; registering the same handler
    /// twice runs it twice. Any `Fn(&Value, Option<DeliveryId>)` closure
    /// qualifies.
    pub fn subscribe<H>(&self, signal: impl Into<String>, handler: H)
    where
        H: SignalHandler + 'static,
    {
        self.ctx.registry.subscribe(signal, Arc::new(handler));
    }

    /// Raises `signal` locally, invoking every subscriber synchronously.
    ///
    /// Locally-raised signals carry no delivery id and are never
    /// deduplicated. If [`relay_signal`](Self::relay_signal) was called for
    /// this signal, the relay subscriber also forwards it to the remote
    /// peer.
    pub fn dispatch(&self, signal: &str, opts: &Value) {
        self.ctx.registry.dispatch(signal, opts, None, &self.ctx.dedup);
    }

    /// Couples local dispatch of `signal` to the network.
    ///
    /// Installs a subscriber on the ordinary subscription list that forwards
    /// locally-raised invocations (no delivery id) to the connection as a
    /// `{signal, opts}` frame — buffered while disconnected. Invocations
    /// carrying a delivery id originated remotely and are suppressed, so a
    /// broadcast is never echoed back to its sender.
    pub fn relay_signal(&self, signal: &str) {
        let link = Arc::clone(&self.ctx.link);
        let name = signal.to_string();
        self.subscribe(signal, move |opts: &Value, delivery_id: Option<DeliveryId>| {
            if delivery_id.is_some() {
                return;
            }
            let frame = SignalFrame {
                signal: name.clone(),
                opts: opts.clone(),
            };
            link.send_signal(frame.encode());
        });
    }

    /// Invokes `func` on the remote peer, returning the pending result
    /// handle.
    ///
    /// Allocates the next session-unique call id, registers the pending
    /// entry, and writes a `{func, opts, result_id}` frame directly to the
    /// connection — call frames never enter the outbound buffer. While the
    /// link is not open the returned handle is rejected immediately with
    /// [`CallError::NotConnected`]. A `Value::Null` opts is sent as `{}`.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime while a per-call timeout is
    /// configured (the timeout timer is a spawned task).
    pub fn invoke_remote(&self, func: &str, opts: Value) -> PendingCall {
        let call_id = format!("f{}", self.ctx.call_counter.fetch_add(1, Ordering::Relaxed));
        let opts = if opts.is_null() {
            Value::Object(serde_json::Map::new())
        } else {
            opts
        };

        let pending = self.ctx.correlator.register(&call_id);
        let frame = CallFrame {
            func: func.to_string(),
            opts,
            result_id: call_id.clone(),
        };

        match self.ctx.link.send_call(frame.encode()) {
            Ok(()) => {
                tracing::debug!(func, call_id = %call_id, "remote call issued");
                if let Some(timeout) = self.ctx.config.call_timeout {
                    let ctx = Arc::clone(&self.ctx);
                    tokio::spawn(async move {
                        tokio::time::sleep(timeout).await;
                        ctx.correlator.fail(&call_id, CallError::Timeout);
                    });
                }
            }
            Err(err) => {
                tracing::warn!(func, call_id = %call_id, error = %err, "remote call not sent");
                self.ctx.correlator.fail(&call_id, CallError::NotConnected);
            }
        }
        pending
    }

    /// Opens the managed connection to `url`.
    ///
    /// Spawns the supervision loop, which reconnects forever with the
    /// configured delay; the returned handle never completes on its own and
    /// may be used to abort the connection for teardown.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn start(&self, url: impl Into<String>) -> JoinHandle<()> {
        tokio::spawn(manager::run(Arc::clone(&self.ctx), url.into()))
    }

    /// Current connection state.
    #[must_use]
    pub fn link_state(&self) -> LinkState {
        self.ctx.link.state()
    }

    /// Subscribes to connection transitions (`Connected` / `Disconnected`).
    #[must_use]
    pub fn link_events(&self) -> broadcast::Receiver<LinkEvent> {
        self.ctx.link.events()
    }

    /// Number of remote calls still awaiting a reply.
    #[must_use]
    pub fn pending_calls(&self) -> usize {
        self.ctx.correlator.pending_count()
    }
}
