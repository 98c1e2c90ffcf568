//! Socket lifecycle: dial, pump, heartbeat echo, reconnect.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{Message, Utf8Bytes};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::bus::BusContext;
use crate::wire;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Supervision loop for the managed connection.
///
/// Dials `url`, pumps the socket until it drops, then sleeps the configured
/// reconnect delay and dials again — forever. Error and close are treated
/// identically; a failed connect attempt takes the same delay as a lost
/// connection.
pub(crate) async fn run(ctx: Arc<BusContext>, url: String) {
    loop {
        ctx.link.set_connecting();
        match connect_async(url.as_str()).await {
            Ok((stream, _response)) => {
                tracing::info!(%url, "websocket connected");
                pump(&ctx, stream).await;
                tracing::info!(%url, "connection closed");
            }
            Err(err) => {
                tracing::warn!(%url, error = %err, "connect attempt failed");
            }
        }
        ctx.link.close();
        tokio::time::sleep(ctx.config.reconnect_delay).await;
    }
}

/// Runs the read/write loop for one live socket.
///
/// Installs a fresh writer channel on the link (which flushes the outbound
/// buffer), then forwards queued frames to the sink and routes inbound
/// frames until either side of the socket fails.
async fn pump(ctx: &BusContext, stream: WsStream) {
    let (mut sink, mut source) = stream.split();
    let (writer, mut outbound) = mpsc::unbounded_channel();
    ctx.link.open(writer.clone());

    loop {
        tokio::select! {
            frame = outbound.recv() => {
                match frame {
                    Some(message) => {
                        if let Err(err) = sink.send(message).await {
                            tracing::warn!(error = %err, "websocket write failed");
                            break;
                        }
                    }
                    // The link dropped its writer; connection is being torn down.
                    None => break,
                }
            }
            inbound = source.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => handle_text(ctx, &writer, &text),
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        tracing::warn!(error = %err, "websocket read failed");
                        break;
                    }
                }
            }
        }
    }
}

/// Handles one inbound text frame: heartbeats are echoed verbatim and never
/// routed, everything else goes to the message router.
fn handle_text(ctx: &BusContext, writer: &mpsc::UnboundedSender<Message>, text: &Utf8Bytes) {
    if text.as_str() == ctx.config.heartbeat {
        tracing::trace!("heartbeat echoed");
        let _ = writer.send(Message::Text(text.clone()));
        return;
    }
    wire::route(text.as_str(), &ctx.registry, &ctx.dedup, &ctx.correlator);
}
