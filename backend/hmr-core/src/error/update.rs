use common::ErrorLocation;

use thiserror::Error as ThisError;

/// Failure raised by a chunk update callback.
///
/// Any of these aborts the remaining callbacks for the update and forces a
/// full page reload.
#[derive(Debug, ThisError)]
pub enum UpdateError {
    /// The update kind cannot be applied to this kind of chunk.
    #[error("Unsupported Update Error: {message} {location}")]
    Unsupported {
        message: String,
        location: ErrorLocation,
    },

    /// An application callback failed, or panicked.
    #[error("Callback Error: {message} {location}")]
    Callback {
        message: String,
        location: ErrorLocation,
    },
}
