//! Shared primitives for the hot-reload workspace.
//!
//! Every crate in the workspace reports failures with an [`ErrorLocation`] so a
//! log line points at the code that produced it, not at the error constructor.
//!
//! ## Architecture
//!
//! - **common** (this crate): cross-cutting primitives
//! - **models**: wire protocol data structures
//! - **hmr-core**: subscription registry, dispatch and reconnect handling
//! - **hmr-watch**: headless driver wiring a socket and a page to the core

pub mod error;

pub use error::error_location::ErrorLocation;
