//! Test helpers for socket integration tests.
//!
//! A throwaway update server on 127.0.0.1 that accepts WebSocket clients and
//! hands each accepted connection to the test.

use hmr_core::transport::TransportEvent;
use hmr_watch::config::ReconnectPolicy;

use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};
use tokio::time::timeout;
use tokio_tungstenite::{WebSocketStream, accept_async};

pub type ServerSocket = WebSocketStream<TcpStream>;

/// How long any single step may take before the test fails.
pub const STEP_TIMEOUT: Duration = Duration::from_secs(5);

/// Retry quickly so reconnect tests stay fast.
pub const FAST_RECONNECT: ReconnectPolicy = ReconnectPolicy {
    max_interval: Duration::from_millis(100),
    give_up_after: Some(Duration::from_secs(5)),
};

/// Start a server on an ephemeral port.
///
/// Returns the `ws://` URL and a channel yielding each accepted connection.
pub async fn start_update_server() -> (String, UnboundedReceiver<ServerSocket>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let address = listener.local_addr().expect("No local address");
    let (accepted_tx, accepted_rx) = unbounded_channel();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let Ok(socket) = accept_async(stream).await else {
                continue;
            };
            if accepted_tx.send(socket).is_err() {
                return;
            }
        }
    });

    (format!("ws://{address}/turbopack-hmr"), accepted_rx)
}

/// Next accepted connection, failing the test on timeout.
pub async fn next_connection(accepted: &mut UnboundedReceiver<ServerSocket>) -> ServerSocket {
    timeout(STEP_TIMEOUT, accepted.recv())
        .await
        .expect("Timed out waiting for a connection")
        .expect("Test server stopped")
}

/// Next event from the socket task, failing the test on timeout.
pub async fn next_event(events: &mut UnboundedReceiver<TransportEvent>) -> Option<TransportEvent> {
    timeout(STEP_TIMEOUT, events.recv())
        .await
        .expect("Timed out waiting for a transport event")
}
