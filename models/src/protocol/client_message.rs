use crate::ChunkPath;

use serde::{Deserialize, Serialize};

/// A message sent from the client to the update server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    /// Declares interest in future updates for a chunk.
    Subscribe {
        #[serde(rename = "chunkPath")]
        chunk_path: ChunkPath,
    },
}

impl ClientMessage {
    pub fn subscribe(chunk_path: ChunkPath) -> Self {
        ClientMessage::Subscribe { chunk_path }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
