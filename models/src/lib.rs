//! Wire models for the chunk update protocol.
//!
//! Pure data structures shared between the update server and the client
//! core. Nothing here talks to a socket or a document; see `hmr-core` for
//! the behavior built on top of these types.

pub mod chunk_path;
pub mod error;
pub mod protocol;

pub use chunk_path::ChunkPath;
pub use common::ErrorLocation;
pub use error::model_error::ModelError;
pub use protocol::{ClientMessage, ServerMessage};
