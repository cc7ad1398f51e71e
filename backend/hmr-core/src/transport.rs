//! Boundary with the socket that carries the update protocol.
//!
//! Connecting, reconnecting and framing all happen on the other side of this
//! boundary. The core only sees lifecycle events and a way to send text.

use crate::error::transport::TransportError;

/// Lifecycle event delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A live connection was established. Fired again after every reconnect.
    Connected,

    /// One raw inbound payload.
    Message(String),
}

/// Outbound half of the transport.
pub trait Transport {
    /// Send one text payload to the update server.
    ///
    /// Implementations may drop payloads while disconnected; the client
    /// replays its subscriptions on the next [`TransportEvent::Connected`].
    fn send(&self, payload: String) -> Result<(), TransportError>;
}
