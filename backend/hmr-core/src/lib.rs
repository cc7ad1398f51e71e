//! Client side of the chunk hot-reload protocol.
//!
//! The core keeps a page subscribed to updates for the build output
//! ("chunks") it has loaded, and applies those updates without a full page
//! reload whenever it safely can.
//!
//! - [`client::HmrClient`] reacts to transport lifecycle events: it replays
//!   every subscription on (re)connect and dispatches inbound updates.
//! - [`client::SubscriptionRegistry`] maps each chunk path to its callbacks.
//! - [`client::RegistrationSlot`] accepts registrations from code that ran
//!   before the client existed.
//!
//! The socket, the document and the reload mechanism are collaborators,
//! reached through the traits in [`transport`] and [`page`].

pub mod client;
pub mod config;
pub mod error;
pub mod page;
pub mod transport;

pub use client::{
    ChunkUpdateCallback, DispatchOutcome, EventOutcome, HmrClient, PendingRegistration,
    RegistrationSlot, SubscriptionRegistry,
};
pub use config::ClientOptions;
pub use error::CoreError;

#[cfg(test)]
mod tests;
