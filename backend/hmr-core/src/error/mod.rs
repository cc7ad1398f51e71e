pub mod bridge;
pub mod config;
pub mod protocol;
pub mod transport;
pub mod update;

pub use bridge::BridgeError;
pub use config::ConfigError;
pub use protocol::ProtocolError;
pub use transport::TransportError;
pub use update::UpdateError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Bridge(#[from] bridge::BridgeError),

    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Protocol(#[from] protocol::ProtocolError),

    #[error(transparent)]
    Transport(#[from] transport::TransportError),
}
