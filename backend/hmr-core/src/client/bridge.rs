use crate::client::registry::{ChunkUpdateCallback, SubscriptionRegistry};
use crate::error::bridge::BridgeError;

use common::ErrorLocation;
use models::ChunkPath;

use std::cell::RefCell;
use std::mem::replace;
use std::panic::Location;
use std::rc::{Rc, Weak};

use log::{debug, warn};

thread_local! {
    static CHUNK_UPDATE_LISTENERS: RegistrationSlot = RegistrationSlot::new();
}

/// A registration made through the slot before any client was installed.
pub struct PendingRegistration {
    pub chunk_path: ChunkPath,
    pub callback: ChunkUpdateCallback,
}

enum SlotState {
    Vacant,
    Queued(Vec<PendingRegistration>),
    Installed(Weak<RefCell<SubscriptionRegistry>>),
    Foreign(String),
}

/// Well-known hand-off point for chunk update registrations.
///
/// Code that loads before the client can [`push`](Self::push) registrations
/// here; they are queued. When a client connects it claims the slot, drains
/// the queue once, in order, and from then on every push goes straight into
/// its registry.
///
/// Only one live client may own the slot. A slot claimed by a client that has
/// since been dropped (a page reload, in a headless host) is free again.
#[derive(Clone)]
pub struct RegistrationSlot {
    state: Rc<RefCell<SlotState>>,
}

impl RegistrationSlot {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(SlotState::Vacant)),
        }
    }

    /// The page-wide slot for the current thread.
    pub fn global() -> Self {
        CHUNK_UPDATE_LISTENERS.with(Clone::clone)
    }

    /// Register interest in a chunk, or queue it until a client connects.
    pub fn push(&self, chunk_path: ChunkPath, callback: ChunkUpdateCallback) {
        let live = match &*self.state.borrow() {
            SlotState::Installed(registry) => registry.upgrade(),
            _ => None,
        };

        if let Some(registry) = live {
            registry.borrow_mut().register(chunk_path, callback);
            return;
        }

        let mut state = self.state.borrow_mut();
        match &mut *state {
            SlotState::Queued(pending) => {
                pending.push(PendingRegistration {
                    chunk_path,
                    callback,
                });
            }
            SlotState::Foreign(owner) => {
                warn!("Dropping registration for chunk `{chunk_path}`: slot is owned by {owner}");
            }
            SlotState::Vacant | SlotState::Installed(_) => {
                debug!("Queueing registration for chunk `{chunk_path}` until a client connects");
                *state = SlotState::Queued(vec![PendingRegistration {
                    chunk_path,
                    callback,
                }]);
            }
        }
    }

    /// Mark the slot as owned by a handler that is not a [`HmrClient`](crate::HmrClient).
    ///
    /// Any registrations queued so far are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Conflict`] if the slot is already owned.
    #[track_caller]
    pub fn occupy(&self, owner: impl Into<String>) -> Result<(), BridgeError> {
        let mut state = self.state.borrow_mut();
        ensure_unowned(&state)?;
        *state = SlotState::Foreign(owner.into());
        Ok(())
    }

    /// Number of registrations waiting for a client.
    pub fn pending_len(&self) -> usize {
        match &*self.state.borrow() {
            SlotState::Queued(pending) => pending.len(),
            _ => 0,
        }
    }

    /// Whether a live client currently owns the slot.
    pub fn is_installed(&self) -> bool {
        matches!(
            &*self.state.borrow(),
            SlotState::Installed(registry) if registry.strong_count() > 0
        )
    }

    /// Claim the slot for `registry` and hand back everything queued so far.
    #[track_caller]
    pub(crate) fn install(
        &self,
        registry: &Rc<RefCell<SubscriptionRegistry>>,
    ) -> Result<Vec<PendingRegistration>, BridgeError> {
        let mut state = self.state.borrow_mut();
        ensure_unowned(&state)?;

        let previous = replace(&mut *state, SlotState::Installed(Rc::downgrade(registry)));
        Ok(match previous {
            SlotState::Queued(pending) => pending,
            _ => Vec::new(),
        })
    }
}

impl Default for RegistrationSlot {
    fn default() -> Self {
        Self::new()
    }
}

#[track_caller]
fn ensure_unowned(state: &SlotState) -> Result<(), BridgeError> {
    match state {
        SlotState::Foreign(owner) => Err(BridgeError::Conflict {
            message: format!("A separate HMR handler was already registered ({owner})"),
            location: ErrorLocation::from(Location::caller()),
        }),
        SlotState::Installed(registry) if registry.strong_count() > 0 => {
            Err(BridgeError::Conflict {
                message: String::from("A separate HMR handler was already registered"),
                location: ErrorLocation::from(Location::caller()),
            })
        }
        _ => Ok(()),
    }
}
