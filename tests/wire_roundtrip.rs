//! End-to-end wire tests against an in-process WebSocket peer.
//!
//! Each test binds a local listener, points the bus at it, and plays the
//! remote side of the protocol by hand: reading relay/call frames, sending
//! broadcasts, replies, and heartbeats.

#![allow(clippy::panic)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;

use signal_bus::conn::LinkEvent;
use signal_bus::error::CallError;
use signal_bus::signal::DeliveryId;
use signal_bus::{BusConfig, SignalBus};

const WAIT: Duration = Duration::from_secs(5);

type WsServer = WebSocketStream<TcpStream>;

/// Binds a listener on an ephemeral port and returns it with its ws URL.
async fn bind_peer() -> (TcpListener, String) {
    let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
        panic!("failed to bind test listener");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("listener has no local addr");
    };
    (listener, format!("ws://{addr}"))
}

/// Accepts one client connection and completes the WebSocket handshake.
async fn accept_peer(listener: &TcpListener) -> WsServer {
    let Ok(Ok((stream, _))) = timeout(WAIT, listener.accept()).await else {
        panic!("no client connected");
    };
    let Ok(handshake) = timeout(WAIT, tokio_tungstenite::accept_async(stream)).await else {
        panic!("handshake timed out");
    };
    let Ok(server) = handshake else {
        panic!("websocket handshake failed");
    };
    server
}

/// Reads the next text frame from the server side.
async fn next_text(server: &mut WsServer) -> String {
    loop {
        let Ok(Some(Ok(message))) = timeout(WAIT, server.next()).await else {
            panic!("expected a frame from the client");
        };
        if let Message::Text(text) = message {
            return text.as_str().to_string();
        }
    }
}

fn test_config() -> BusConfig {
    BusConfig {
        reconnect_delay: Duration::from_millis(50),
        ..BusConfig::default()
    }
}

async fn await_event(events: &mut tokio::sync::broadcast::Receiver<LinkEvent>) -> LinkEvent {
    let Ok(Ok(event)) = timeout(WAIT, events.recv()).await else {
        panic!("expected a link event");
    };
    event
}

#[tokio::test]
async fn call_round_trip_resolves_with_the_result() {
    let (listener, url) = bind_peer().await;
    let bus = SignalBus::new(test_config());
    let mut events = bus.link_events();
    let _conn = bus.start(url);

    let mut server = accept_peer(&listener).await;
    assert_eq!(await_event(&mut events).await, LinkEvent::Connected);

    let pending = bus.invoke_remote("add", serde_json::json!({"a": 2, "b": 3}));
    assert_eq!(
        next_text(&mut server).await,
        r#"{"func":"add","opts":{"a":2,"b":3},"result_id":"f1"}"#
    );

    let sent = server
        .send(Message::text(r#"{"result_id":"f1","result":5}"#))
        .await;
    assert!(sent.is_ok());

    let Ok(Ok(value)) = timeout(WAIT, pending).await else {
        panic!("call did not resolve");
    };
    assert_eq!(value, serde_json::json!(5));
    assert_eq!(bus.pending_calls(), 0);
}

#[tokio::test]
async fn call_round_trip_rejects_with_the_exception() {
    let (listener, url) = bind_peer().await;
    let bus = SignalBus::new(test_config());
    let mut events = bus.link_events();
    let _conn = bus.start(url);

    let mut server = accept_peer(&listener).await;
    assert_eq!(await_event(&mut events).await, LinkEvent::Connected);

    let pending = bus.invoke_remote("explode", Value::Null);
    assert_eq!(
        next_text(&mut server).await,
        r#"{"func":"explode","opts":{},"result_id":"f1"}"#
    );

    let sent = server
        .send(Message::text(r#"{"result_id":"f1","exception":"boom"}"#))
        .await;
    assert!(sent.is_ok());

    let Ok(Err(CallError::Remote(payload))) = timeout(WAIT, pending).await else {
        panic!("call should have been rejected");
    };
    assert_eq!(payload, serde_json::json!("boom"));
}

#[tokio::test]
async fn heartbeat_is_echoed_and_never_dispatched() {
    let (listener, url) = bind_peer().await;
    let bus = SignalBus::new(test_config());
    let notifications = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&notifications);
    bus.subscribe("notification", move |_: &Value, _: Option<DeliveryId>| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let mut events = bus.link_events();
    let _conn = bus.start(url);

    let mut server = accept_peer(&listener).await;
    assert_eq!(await_event(&mut events).await, LinkEvent::Connected);

    let sent = server.send(Message::text("--HEARTBEAT--")).await;
    assert!(sent.is_ok());

    // Receiving the echo back proves the client has processed the frame.
    assert_eq!(next_text(&mut server).await, "--HEARTBEAT--");
    assert_eq!(notifications.load(Ordering::SeqCst), 0);
    assert_eq!(bus.pending_calls(), 0);
}

#[tokio::test]
async fn signals_buffered_while_disconnected_flush_in_order() {
    let (listener, url) = bind_peer().await;
    let bus = SignalBus::new(test_config());
    bus.relay_signal("ping");

    // Raised before start: the link is closed, so these buffer.
    for n in 1..=3 {
        bus.dispatch("ping", &serde_json::json!({"n": n}));
    }

    let _conn = bus.start(url);
    let mut server = accept_peer(&listener).await;

    for n in 1..=3 {
        assert_eq!(
            next_text(&mut server).await,
            format!(r#"{{"signal":"ping","opts":{{"n":{n}}}}}"#)
        );
    }
}

#[tokio::test]
async fn duplicate_broadcast_dispatches_once() {
    let (listener, url) = bind_peer().await;
    let bus = SignalBus::new(test_config());
    let deliveries = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&deliveries);
    bus.subscribe("refresh", move |_: &Value, _: Option<DeliveryId>| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let mut events = bus.link_events();
    let _conn = bus.start(url);

    let mut server = accept_peer(&listener).await;
    assert_eq!(await_event(&mut events).await, LinkEvent::Connected);

    let broadcast = r#"{"signal":"refresh","opts":{},"signal_id":"s1"}"#;
    for _ in 0..2 {
        let sent = server.send(Message::text(broadcast)).await;
        assert!(sent.is_ok());
    }

    // Fence: a call reply is processed after the broadcasts, so once it
    // settles the duplicate has been seen and suppressed.
    let pending = bus.invoke_remote("fence", Value::Null);
    let frame = next_text(&mut server).await;
    assert!(frame.contains("\"fence\""));
    let sent = server
        .send(Message::text(r#"{"result_id":"f1","result":null}"#))
        .await;
    assert!(sent.is_ok());
    let Ok(Ok(_)) = timeout(WAIT, pending).await else {
        panic!("fence call did not resolve");
    };

    assert_eq!(deliveries.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn lost_connection_reconnects_after_the_delay() {
    let (listener, url) = bind_peer().await;
    let bus = SignalBus::new(test_config());
    let mut events = bus.link_events();
    let _conn = bus.start(url);

    let mut server = accept_peer(&listener).await;
    assert_eq!(await_event(&mut events).await, LinkEvent::Connected);

    // Kill the connection from the peer side.
    let closed = server.close(None).await;
    assert!(closed.is_ok());
    drop(server);
    assert_eq!(await_event(&mut events).await, LinkEvent::Disconnected);

    // The bus dials again after the delay, with no upper bound on retries.
    let _second = accept_peer(&listener).await;
    assert_eq!(await_event(&mut events).await, LinkEvent::Connected);
}
