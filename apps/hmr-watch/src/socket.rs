//! WebSocket transport for the update protocol.
//!
//! A background task owns the socket. It connects (retrying with exponential
//! backoff), reports every successful connection as
//! [`TransportEvent::Connected`], forwards text frames as
//! [`TransportEvent::Message`], and writes outbound payloads handed to
//! [`SocketTransport`].
//!
//! Payloads sent while no connection is up are discarded on the next
//! connect: the client replays its subscriptions on `Connected` anyway.

use crate::config::ReconnectPolicy;

use common::ErrorLocation;
use hmr_core::error::TransportError;
use hmr_core::transport::{Transport, TransportEvent};

use std::panic::Location;

use backoff::{ExponentialBackoff, backoff::Backoff};
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, trace, warn};
use tokio::net::TcpStream;
use tokio::spawn as TokioSpawn;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;
use tokio::time::sleep as TokioSleep;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type SocketStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Outbound half of the socket, handed to the hot reload client.
#[derive(Clone)]
pub struct SocketTransport {
    outbound: UnboundedSender<String>,
}

impl Transport for SocketTransport {
    fn send(&self, payload: String) -> Result<(), TransportError> {
        self.outbound
            .send(payload)
            .map_err(|e| TransportError::Closed {
                message: format!("Socket task has stopped, dropped payload {}", e.0),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

/// A running socket task and the channels connecting it to a session.
pub struct SocketHandle {
    pub transport: SocketTransport,
    pub events: UnboundedReceiver<TransportEvent>,
    pub task: JoinHandle<()>,
}

/// Spawn the socket task for `url`.
///
/// The task runs until reconnecting gives up (per `policy`), the event
/// receiver is dropped, or every [`SocketTransport`] clone is dropped.
pub fn spawn_socket(url: String, policy: ReconnectPolicy) -> SocketHandle {
    let (outbound_tx, outbound_rx) = unbounded_channel();
    let (events_tx, events_rx) = unbounded_channel();

    let task = TokioSpawn(socket_loop(url, policy, outbound_rx, events_tx));

    SocketHandle {
        transport: SocketTransport {
            outbound: outbound_tx,
        },
        events: events_rx,
        task,
    }
}

async fn socket_loop(
    url: String,
    policy: ReconnectPolicy,
    mut outbound_rx: UnboundedReceiver<String>,
    events_tx: UnboundedSender<TransportEvent>,
) {
    loop {
        let Some(stream) = connect_with_backoff(&url, policy).await else {
            return;
        };

        let mut stale = 0;
        while outbound_rx.try_recv().is_ok() {
            stale += 1;
        }
        if stale > 0 {
            debug!("Discarded {stale} payloads queued while disconnected");
        }

        if events_tx.send(TransportEvent::Connected).is_err() {
            return;
        }

        let (mut write, mut read) = stream.split();

        loop {
            tokio::select! {
                incoming = read.next() => match incoming {
                    Some(Ok(Message::Text(text))) => {
                        trace!("Received {}", text.as_str());
                        if events_tx.send(TransportEvent::Message(text.as_str().to_owned())).is_err() {
                            return;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        warn!("Update server at {url} closed the connection");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!("Lost connection to update server at {url}: {e}");
                        break;
                    }
                },
                outgoing = outbound_rx.recv() => match outgoing {
                    Some(payload) => {
                        if let Err(e) = write.send(Message::Text(payload.into())).await {
                            warn!("Failed to send to update server at {url}: {e}");
                            break;
                        }
                    }
                    None => {
                        debug!("All transports dropped, closing socket");
                        let _ = write.close().await;
                        return;
                    }
                },
            }
        }
    }
}

async fn connect_with_backoff(url: &str, policy: ReconnectPolicy) -> Option<SocketStream> {
    let mut backoff = ExponentialBackoff {
        max_interval: policy.max_interval,
        max_elapsed_time: policy.give_up_after,
        ..Default::default()
    };

    loop {
        match connect_async(url).await {
            Ok((stream, _response)) => {
                info!("Connected to update server at {url}");
                return Some(stream);
            }
            Err(e) => match backoff.next_backoff() {
                Some(duration) => {
                    debug!("Connecting to {url} failed ({e}), retrying after {duration:?}");
                    TokioSleep(duration).await;
                }
                None => {
                    error!("Giving up on update server at {url}: {e}");
                    return None;
                }
            },
        }
    }
}
