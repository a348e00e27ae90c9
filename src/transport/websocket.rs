//! WebSocket transport
//!
//! Accepts TCP connections, upgrades them to WebSockets and bridges each one
//! to the hub:
//! - connect registers a `Client` whose outbound channel is drained onto the
//!   socket by a dedicated send loop
//! - every inbound text frame goes through the `Dispatcher`; a reply, if
//!   any, is queued on the same outbound channel so it stays ordered with
//!   broadcasts
//! - disconnect (read side ending or the send loop failing) unregisters the
//!   connection, which removes it from all of its topics
//!
//! On shutdown the accept loop stops and the hub drops every connection;
//! each send loop then closes its socket.

use std::future::Future;
use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tracing::{debug, info, warn};
use tungstenite::protocol::Message as WsMessage;

use crate::config::Settings;
use crate::hub::Hub;
use crate::transport::dispatch::Dispatcher;
use crate::transport::message::ServerMessage;
use crate::utils::Result;

/// Bind to the configured address and serve until `shutdown` resolves.
pub async fn start_websocket_server<F>(hub: Hub, settings: Settings, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    let listener = TcpListener::bind(settings.server.addr()).await?;
    serve(listener, hub, settings, shutdown).await
}

/// Serve on an already-bound listener until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, hub: Hub, settings: Settings, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    info!("WebSocket server listening on ws://{}", listener.local_addr()?);

    let dispatcher = Dispatcher::new(hub.clone(), settings.tracking.strict_identifiers);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested; no longer accepting connections");
                break;
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    tokio::spawn(handle_connection(stream, peer, hub.clone(), dispatcher.clone()));
                }
                Err(e) => warn!("Failed to accept connection: {e}"),
            }
        }
    }

    hub.shutdown();
    Ok(())
}

async fn handle_connection(stream: TcpStream, peer: SocketAddr, hub: Hub, dispatcher: Dispatcher) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("WebSocket handshake error from {peer}: {e}");
            return;
        }
    };
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();

    let client_id = match hub.connect(tx) {
        Ok(id) => id,
        Err(err) => {
            if let Ok(json) = serde_json::to_string(&ServerMessage::error(err.to_string())) {
                let _ = ws_sender.send(WsMessage::text(json)).await;
            }
            let _ = ws_sender.close().await;
            return;
        }
    };
    debug!("{client_id} connected from {peer}");

    {
        let hub = hub.clone();
        let client_id = client_id.clone();

        tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                if let Err(e) = ws_sender.send(msg).await {
                    warn!("Failed to send message to {client_id}: {e}");
                    break;
                }
            }
            let _ = ws_sender.close().await;
            hub.disconnect(&client_id);
            debug!("Send loop closed for {client_id}");
        });
    }

    while let Some(frame) = ws_receiver.next().await {
        match frame {
            Ok(WsMessage::Text(text)) => {
                if let Some(reply) = dispatcher.handle_text(&client_id, text.as_str()) {
                    hub.send_to(&client_id, &reply);
                }
            }
            Ok(WsMessage::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!("Read error from {client_id}: {e}");
                break;
            }
        }
    }

    hub.disconnect(&client_id);
}
