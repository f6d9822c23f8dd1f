//! Checkpointer trait and error type.

use async_trait::async_trait;
use thiserror::Error;

use crate::graph::StageId;

use super::checkpoint::{Checkpoint, CheckpointListItem};

/// Error from checkpoint persistence.
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("serialization: {0}")]
    Serialization(String),
    #[error("storage: {0}")]
    Storage(String),
}

/// Saves and loads run checkpoints, keyed by run id.
///
/// **Interaction**: Used as `Arc<dyn Checkpointer<S, K>>` by
/// [`StateGraph::with_checkpointer`](crate::graph::StateGraph::with_checkpointer).
#[async_trait]
pub trait Checkpointer<S, K>: Send + Sync
where
    S: Clone + Send + Sync + 'static,
    K: StageId,
{
    /// Stores a checkpoint; returns its id.
    async fn put(&self, checkpoint: &Checkpoint<S, K>) -> Result<String, CheckpointError>;

    /// Most recently stored checkpoint of `run_id`.
    async fn get_latest(&self, run_id: &str) -> Result<Option<Checkpoint<S, K>>, CheckpointError>;

    /// A specific checkpoint of `run_id`.
    async fn get(
        &self,
        run_id: &str,
        checkpoint_id: &str,
    ) -> Result<Option<Checkpoint<S, K>>, CheckpointError>;

    /// Checkpoint summaries of `run_id`, oldest first; `limit` keeps the newest `n`.
    async fn list(
        &self,
        run_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<CheckpointListItem>, CheckpointError>;
}
