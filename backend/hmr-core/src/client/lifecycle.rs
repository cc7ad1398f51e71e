use crate::client::bridge::{PendingRegistration, RegistrationSlot};
use crate::client::css::subscribe_to_initial_css_chunks;
use crate::client::dispatcher::{DispatchOutcome, dispatch};
use crate::client::registry::{ChunkUpdateCallback, SubscriptionRegistry};
use crate::config::ClientOptions;
use crate::error::CoreError;
use crate::error::protocol::ProtocolError;
use crate::page::{Document, PageReloader};
use crate::transport::{Transport, TransportEvent};

use common::ErrorLocation;
use models::{ChunkPath, ServerMessage};

use std::cell::RefCell;
use std::panic::Location;
use std::rc::Rc;

use futures_util::{Stream, StreamExt, pin_mut};
use log::{debug, info};

/// Result of handling one transport event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// The connection came up and this many chunks were re-announced.
    Resubscribed { chunks: usize },

    /// An update was parsed and dispatched.
    Dispatched(DispatchOutcome),
}

/// The hot-reload client for one page.
///
/// Created once per page by [`connect`](Self::connect) and dropped on a full
/// reload; nothing survives into the next instance.
pub struct HmrClient {
    registry: Rc<RefCell<SubscriptionRegistry>>,
    reloader: Rc<dyn PageReloader>,
}

impl HmrClient {
    /// Connect using the page-wide [`RegistrationSlot::global`].
    ///
    /// # Errors
    ///
    /// - [`CoreError::Config`] if `options` fail validation
    /// - [`CoreError::Bridge`] if another live handler owns the slot
    pub fn connect(
        options: &ClientOptions,
        transport: Rc<dyn Transport>,
        document: &dyn Document,
        reloader: Rc<dyn PageReloader>,
    ) -> Result<Self, CoreError> {
        Self::connect_with_slot(
            &RegistrationSlot::global(),
            options,
            transport,
            document,
            reloader,
        )
    }

    /// Connect using an explicit registration slot.
    ///
    /// Claims the slot, registers everything queued in it (in queue order),
    /// then subscribes to every CSS chunk already linked from `document`.
    pub fn connect_with_slot(
        slot: &RegistrationSlot,
        options: &ClientOptions,
        transport: Rc<dyn Transport>,
        document: &dyn Document,
        reloader: Rc<dyn PageReloader>,
    ) -> Result<Self, CoreError> {
        options.validate()?;

        let registry = Rc::new(RefCell::new(SubscriptionRegistry::new(transport)));
        let pending = slot.install(&registry)?;

        if !pending.is_empty() {
            debug!("Draining {} queued chunk registrations", pending.len());
        }
        for PendingRegistration {
            chunk_path,
            callback,
        } in pending
        {
            registry.borrow_mut().register(chunk_path, callback);
        }

        let css_chunks =
            subscribe_to_initial_css_chunks(&registry, document, &options.asset_prefix);

        info!(
            "Hot reload client ready: {} chunks subscribed ({css_chunks} CSS)",
            registry.borrow().len()
        );

        Ok(Self { registry, reloader })
    }

    /// Register `callback` for updates to `chunk_path`.
    pub fn on_chunk_update(&self, chunk_path: ChunkPath, callback: ChunkUpdateCallback) {
        self.registry.borrow_mut().register(chunk_path, callback);
    }

    /// React to one transport event.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Protocol`] if a message payload is not a valid
    /// update. Nothing is dispatched in that case.
    pub fn handle_event(&self, event: TransportEvent) -> Result<EventOutcome, CoreError> {
        match event {
            TransportEvent::Connected => {
                let chunks = self.registry.borrow().resubscribe_all();
                Ok(EventOutcome::Resubscribed { chunks })
            }
            TransportEvent::Message(payload) => {
                let update = parse_update(&payload)?;
                let outcome = dispatch(&self.registry, &update, self.reloader.as_ref());
                Ok(EventOutcome::Dispatched(outcome))
            }
        }
    }

    /// Feed transport events through [`handle_event`](Self::handle_event)
    /// until the stream ends.
    ///
    /// # Errors
    ///
    /// Stops at, and returns, the first protocol violation.
    pub async fn run<S>(&self, events: S) -> Result<(), CoreError>
    where
        S: Stream<Item = TransportEvent>,
    {
        pin_mut!(events);
        while let Some(event) = events.next().await {
            self.handle_event(event)?;
        }
        debug!("Transport event stream ended");
        Ok(())
    }

    /// Chunks with at least one callback, in replay order.
    pub fn subscribed_chunks(&self) -> Vec<ChunkPath> {
        self.registry.borrow().chunk_paths().cloned().collect()
    }

    pub fn callback_count(&self, chunk_path: &str) -> usize {
        self.registry.borrow().callback_count(chunk_path)
    }
}

#[track_caller]
fn parse_update(payload: &str) -> Result<ServerMessage, ProtocolError> {
    ServerMessage::from_json(payload).map_err(|e| ProtocolError::Parse {
        message: format!("Malformed update payload: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })
}
