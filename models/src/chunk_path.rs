use crate::ErrorLocation;
use crate::error::model_error::ModelError;

use std::borrow::Borrow;
use std::fmt::{Display, Formatter, Result as FormatResult};
use std::panic::Location;

use serde::{Deserialize, Serialize};

/// Path naming one build output unit, relative to the asset prefix.
///
/// Opaque to the client: two chunk paths are the same chunk only when the
/// strings are equal. The only invariant enforced here is non-emptiness.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChunkPath(String);

impl ChunkPath {
    #[track_caller]
    pub fn new(path: impl Into<String>) -> Result<Self, ModelError> {
        let path = path.into();
        if path.is_empty() {
            return Err(ModelError::Validation {
                message: String::from("Chunk path cannot be empty"),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Ok(Self(path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ChunkPath {
    type Error = ModelError;

    #[track_caller]
    fn try_from(path: String) -> Result<Self, Self::Error> {
        Self::new(path)
    }
}

impl TryFrom<&str> for ChunkPath {
    type Error = ModelError;

    #[track_caller]
    fn try_from(path: &str) -> Result<Self, Self::Error> {
        Self::new(path)
    }
}

impl From<ChunkPath> for String {
    fn from(path: ChunkPath) -> Self {
        path.0
    }
}

impl Borrow<str> for ChunkPath {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ChunkPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for ChunkPath {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        formatter.write_str(&self.0)
    }
}
