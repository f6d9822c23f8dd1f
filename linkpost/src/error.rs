//! Pipeline execution error types.
//!
//! Returned by [`CompiledStateGraph`](crate::graph::CompiledStateGraph) and
//! [`Pipeline`](crate::pipeline::Pipeline). Stage-level failures never surface here:
//! nodes fall back to a degraded value and a status code instead.

use thiserror::Error;

use crate::graph::GraphInterrupt;
use crate::memory::CheckpointError;

/// Engine-level error returned to the caller of a run or resume.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Execution failed with a message (e.g. a stage is not registered).
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// A node asked to pause the run.
    ///
    /// Raised by the human-review stage; the driver catches it, saves a checkpoint
    /// and returns [`RunOutcome::Suspended`](crate::graph::RunOutcome::Suspended).
    /// Never returned from the driver itself.
    #[error("graph interrupted: {0}")]
    Interrupted(GraphInterrupt),

    /// Checkpoint persistence failed.
    #[error("checkpoint: {0}")]
    Checkpoint(#[from] CheckpointError),

    /// Resume was requested for a run whose latest checkpoint is not paused.
    #[error("run is not suspended: {0}")]
    NotSuspended(String),

    /// Resume or status was requested for a run with no checkpoint.
    #[error("run not found: {0}")]
    RunNotFound(String),

    /// The driver executed more stages than allowed without reaching a terminal route.
    #[error("step limit exceeded: {0}")]
    StepLimitExceeded(usize),
}

impl From<GraphInterrupt> for PipelineError {
    fn from(interrupt: GraphInterrupt) -> Self {
        PipelineError::Interrupted(interrupt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Display format of ExecutionFailed contains "execution failed" and the message.
    #[test]
    fn pipeline_error_display_execution_failed() {
        let err = PipelineError::ExecutionFailed("msg".to_string());
        let s = err.to_string();
        assert!(s.contains("execution failed"), "{}", s);
        assert!(s.contains("msg"), "{}", s);
    }

    /// **Scenario**: Resume errors name the offending run id.
    #[test]
    fn resume_errors_name_run() {
        assert!(PipelineError::NotSuspended("run-1".into())
            .to_string()
            .contains("run-1"));
        assert!(PipelineError::RunNotFound("run-2".into())
            .to_string()
            .contains("run-2"));
    }

    /// **Scenario**: A checkpoint error converts with `?` and keeps its message.
    #[test]
    fn checkpoint_error_converts() {
        let err: PipelineError = CheckpointError::Storage("disk full".into()).into();
        assert!(matches!(err, PipelineError::Checkpoint(_)));
        assert!(err.to_string().contains("disk full"));
    }
}
