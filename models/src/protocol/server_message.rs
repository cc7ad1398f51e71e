use crate::ChunkPath;

use serde::{Deserialize, Serialize};
use serde_json::Value;

const RESTART: &str = "restart";
const PARTIAL: &str = "partial";

/// An update pushed by the server for a single chunk.
///
/// Kinds this client does not know are kept as [`ServerMessage::Unknown`]
/// rather than rejected, so they still reach the chunk's callbacks. Every
/// kind must carry a `chunkPath`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireUpdate", into = "WireUpdate")]
pub enum ServerMessage {
    /// The chunk must be fetched again in full.
    Restart { chunk_path: ChunkPath },

    /// An incremental patch for an already loaded chunk.
    Partial {
        chunk_path: ChunkPath,

        /// Patch body. Opaque to the client core; only chunk-specific callbacks
        /// interpret it.
        instruction: Value,
    },

    /// An update kind this client has no handling for.
    Unknown { chunk_path: ChunkPath, kind: String },
}

/// Flat wire shape shared by every update kind.
#[derive(Serialize, Deserialize)]
struct WireUpdate {
    #[serde(rename = "type")]
    kind: String,

    #[serde(rename = "chunkPath")]
    chunk_path: ChunkPath,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    instruction: Value,
}

impl From<WireUpdate> for ServerMessage {
    fn from(wire: WireUpdate) -> Self {
        let WireUpdate {
            kind,
            chunk_path,
            instruction,
        } = wire;

        match kind.as_str() {
            RESTART => ServerMessage::Restart { chunk_path },
            PARTIAL => ServerMessage::Partial {
                chunk_path,
                instruction,
            },
            _ => ServerMessage::Unknown { chunk_path, kind },
        }
    }
}

impl From<ServerMessage> for WireUpdate {
    fn from(message: ServerMessage) -> Self {
        match message {
            ServerMessage::Restart { chunk_path } => WireUpdate {
                kind: RESTART.to_string(),
                chunk_path,
                instruction: Value::Null,
            },
            ServerMessage::Partial {
                chunk_path,
                instruction,
            } => WireUpdate {
                kind: PARTIAL.to_string(),
                chunk_path,
                instruction,
            },
            ServerMessage::Unknown { chunk_path, kind } => WireUpdate {
                kind,
                chunk_path,
                instruction: Value::Null,
            },
        }
    }
}

impl ServerMessage {
    pub fn chunk_path(&self) -> &ChunkPath {
        match self {
            ServerMessage::Restart { chunk_path } => chunk_path,
            ServerMessage::Partial { chunk_path, .. } => chunk_path,
            ServerMessage::Unknown { chunk_path, .. } => chunk_path,
        }
    }

    /// Wire tag of this update.
    pub fn kind(&self) -> &str {
        match self {
            ServerMessage::Restart { .. } => RESTART,
            ServerMessage::Partial { .. } => PARTIAL,
            ServerMessage::Unknown { kind, .. } => kind,
        }
    }

    pub fn from_json(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}
