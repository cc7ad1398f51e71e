//! Subscription bookkeeping and update dispatch.
//!
//! # Architecture
//!
//! Everything here runs on the page's single thread. Components share one
//! [`SubscriptionRegistry`] through `Rc<RefCell<_>>`; no handler suspends, so
//! a borrow never outlives the event that took it.
//!
//! - [`HmrClient`] - lifecycle adapter (`connected` / `message`)
//! - [`SubscriptionRegistry`] - chunk path to callbacks, sends `subscribe`
//! - [`dispatch`] - runs callbacks, escalates failures to a full reload
//! - [`subscribe_to_initial_css_chunks`] - one-shot scan of head stylesheets
//! - [`RegistrationSlot`] - hand-off point for registrations made before
//!   the client existed

mod bridge;
mod css;
mod dispatcher;
mod lifecycle;
mod registry;

pub use bridge::{PendingRegistration, RegistrationSlot};
pub use css::subscribe_to_initial_css_chunks;
pub use dispatcher::{DispatchOutcome, dispatch};
pub use lifecycle::{EventOutcome, HmrClient};
pub use registry::{ChunkUpdateCallback, SubscriptionRegistry};
