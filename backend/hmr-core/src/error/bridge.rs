use common::ErrorLocation;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum BridgeError {
    /// Another live handler already owns the chunk update listener slot.
    #[error("Handler Conflict Error: {message} {location}")]
    Conflict {
        message: String,
        location: ErrorLocation,
    },
}
