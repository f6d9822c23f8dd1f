//! Result of driving a graph: completed, or suspended awaiting external input.

use crate::memory::Checkpoint;

/// Outcome of [`CompiledStateGraph::invoke`](super::CompiledStateGraph::invoke) and
/// [`CompiledStateGraph::resume`](super::CompiledStateGraph::resume).
#[derive(Debug, Clone)]
pub enum RunOutcome<S, K> {
    /// A terminal route was reached; carries the final state.
    Completed(S),
    /// A stage paused the run; resume with the run id.
    Suspended(Suspension<S, K>),
}

impl<S, K> RunOutcome<S, K> {
    /// The final state when completed.
    pub fn completed(self) -> Option<S> {
        match self {
            RunOutcome::Completed(s) => Some(s),
            RunOutcome::Suspended(_) => None,
        }
    }

    /// The suspension when paused.
    pub fn suspended(self) -> Option<Suspension<S, K>> {
        match self {
            RunOutcome::Completed(_) => None,
            RunOutcome::Suspended(s) => Some(s),
        }
    }

    pub fn is_suspended(&self) -> bool {
        matches!(self, RunOutcome::Suspended(_))
    }
}

/// A paused run: the checkpoint to resume from and the payload shown to the caller.
#[derive(Debug, Clone)]
pub struct Suspension<S, K> {
    pub checkpoint: Checkpoint<S, K>,
    pub payload: serde_json::Value,
}

impl<S, K: Copy> Suspension<S, K> {
    pub fn run_id(&self) -> &str {
        &self.checkpoint.run_id
    }

    pub fn checkpoint_id(&self) -> &str {
        &self.checkpoint.id
    }

    /// Stage at which the run paused.
    pub fn stage(&self) -> Option<K> {
        self.checkpoint.paused_stage
    }

    /// State captured at the pause point.
    pub fn state(&self) -> &S {
        &self.checkpoint.state
    }
}
