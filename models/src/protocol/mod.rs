//! Messages exchanged with the update server.
//!
//! Both directions are JSON objects tagged by a `type` field. Field names on
//! the wire are camelCase (`chunkPath`).

mod client_message;
mod server_message;

pub use client_message::ClientMessage;
pub use server_message::ServerMessage;
