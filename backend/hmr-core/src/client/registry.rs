use crate::error::CoreError;
use crate::error::protocol::ProtocolError;
use crate::error::update::UpdateError;
use crate::transport::Transport;

use common::ErrorLocation;
use models::{ChunkPath, ClientMessage, ServerMessage};

use std::panic::Location;
use std::rc::Rc;

use indexmap::IndexMap;
use log::{debug, warn};

/// Callback invoked with every update for the chunk it was registered for.
///
/// Returning an error aborts the remaining callbacks for that update and
/// forces a full page reload.
pub type ChunkUpdateCallback = Rc<dyn Fn(&ServerMessage) -> Result<(), UpdateError>>;

/// Ordered mapping from chunk path to the callbacks interested in it.
///
/// Keys keep first-registration order, which is also the order subscriptions
/// are replayed after a reconnect. A key only exists once a callback has been
/// registered for it, and there is no way to remove one: callbacks live until
/// the page reloads.
pub struct SubscriptionRegistry {
    callbacks: IndexMap<ChunkPath, Vec<ChunkUpdateCallback>>,
    transport: Rc<dyn Transport>,
}

impl SubscriptionRegistry {
    pub fn new(transport: Rc<dyn Transport>) -> Self {
        Self {
            callbacks: IndexMap::new(),
            transport,
        }
    }

    /// Register `callback` for `chunk_path` and announce the subscription.
    ///
    /// A `subscribe` message is sent on every call, even when the chunk is
    /// already subscribed. Send failures are logged and otherwise ignored;
    /// the next `connected` event replays the subscription.
    pub fn register(&mut self, chunk_path: ChunkPath, callback: ChunkUpdateCallback) {
        self.callbacks
            .entry(chunk_path.clone())
            .or_default()
            .push(callback);

        self.subscribe(&chunk_path);
    }

    /// Send a `subscribe` for every known chunk, in key order.
    ///
    /// Returns the number of chunks announced.
    pub fn resubscribe_all(&self) -> usize {
        for chunk_path in self.callbacks.keys() {
            self.subscribe(chunk_path);
        }
        debug!("Replayed {} chunk subscriptions", self.callbacks.len());
        self.callbacks.len()
    }

    /// Snapshot of the callbacks registered for a chunk.
    ///
    /// Returns a copy so the caller can invoke callbacks without holding a
    /// borrow of the registry.
    pub fn callbacks_for(&self, chunk_path: &str) -> Option<Vec<ChunkUpdateCallback>> {
        self.callbacks.get(chunk_path).cloned()
    }

    pub fn callback_count(&self, chunk_path: &str) -> usize {
        self.callbacks.get(chunk_path).map_or(0, Vec::len)
    }

    pub fn chunk_paths(&self) -> impl Iterator<Item = &ChunkPath> {
        self.callbacks.keys()
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    fn subscribe(&self, chunk_path: &ChunkPath) {
        if let Err(e) = self.send(&ClientMessage::subscribe(chunk_path.clone())) {
            warn!("Failed to subscribe to chunk `{chunk_path}`: {e}");
        }
    }

    fn send(&self, message: &ClientMessage) -> Result<(), CoreError> {
        let payload = message.to_json().map_err(|e| ProtocolError::Encode {
            message: format!("Failed to encode client message: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        debug!("Sending {payload}");
        self.transport.send(payload)?;
        Ok(())
    }
}
