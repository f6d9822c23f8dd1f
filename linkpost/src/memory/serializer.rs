//! Serializer for checkpoint state (state <-> bytes).

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::checkpointer::CheckpointError;

/// Converts state to bytes and back. Used by persistent checkpointers.
pub trait Serializer<S>: Send + Sync {
    fn serialize(&self, state: &S) -> Result<Vec<u8>, CheckpointError>;
    fn deserialize(&self, bytes: &[u8]) -> Result<S, CheckpointError>;
}

/// JSON serializer for any serde type.
pub struct JsonSerializer<S> {
    _marker: PhantomData<fn() -> S>,
}

impl<S> JsonSerializer<S> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<S> Default for JsonSerializer<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Serializer<S> for JsonSerializer<S>
where
    S: Serialize + DeserializeOwned,
{
    fn serialize(&self, state: &S) -> Result<Vec<u8>, CheckpointError> {
        serde_json::to_vec(state).map_err(|e| CheckpointError::Serialization(e.to_string()))
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<S, CheckpointError> {
        serde_json::from_slice(bytes).map_err(|e| CheckpointError::Serialization(e.to_string()))
    }
}
