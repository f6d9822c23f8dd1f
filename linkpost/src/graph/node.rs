//! Graph node: one step that reads state and returns a partial update.
//!
//! Used by [`StateGraph`](super::StateGraph) and [`CompiledStateGraph`](super::CompiledStateGraph).

use async_trait::async_trait;

use crate::error::PipelineError;

use super::{GraphState, StageId};

/// A single stage of a graph.
///
/// Receives an owned snapshot of the state and returns a partial update; it never
/// mutates the canonical state directly. Routing after the node is decided by the
/// graph's edges, not by the node. A node pauses the run by returning
/// [`PipelineError::Interrupted`].
#[async_trait]
pub trait Node<S, K>: Send + Sync
where
    S: GraphState,
    K: StageId,
{
    /// Stage this node implements; used as the key in the graph.
    fn id(&self) -> K;

    /// Runs the stage against `state` and returns the fields to merge.
    async fn run(&self, state: S) -> Result<S::Update, PipelineError>;
}
