//! Interrupt signal raised by a node to pause the run for external input.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Interrupt value raised during graph execution.
///
/// The value becomes the suspension payload returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interrupt {
    /// The interrupt value (any JSON-serializable data).
    pub value: serde_json::Value,
    /// Optional interrupt id.
    pub id: Option<String>,
}

impl Interrupt {
    /// Creates a new interrupt with a value.
    pub fn new(value: serde_json::Value) -> Self {
        Self { value, id: None }
    }

    /// Creates a new interrupt with a value and id.
    pub fn with_id(value: serde_json::Value, id: impl Into<String>) -> Self {
        Self {
            value,
            id: Some(id.into()),
        }
    }
}

/// Error raised when a node interrupts the graph.
#[derive(Debug, Clone, Error)]
#[error("Graph interrupted: {0:?}")]
pub struct GraphInterrupt(pub Interrupt);

impl From<Interrupt> for GraphInterrupt {
    fn from(interrupt: Interrupt) -> Self {
        GraphInterrupt(interrupt)
    }
}
