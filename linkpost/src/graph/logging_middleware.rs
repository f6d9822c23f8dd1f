//! Logging middleware that records stage enter/exit and duration around each node run.

use std::marker::PhantomData;
use std::time::Instant;

use async_trait::async_trait;

use crate::error::PipelineError;

use super::{GraphState, NodeInner, NodeMiddleware, StageId};

/// Middleware that logs stage enter/exit around each node run via `tracing`.
///
/// Interrupts are logged at debug level since they are the normal way a run pauses.
pub struct LoggingNodeMiddleware<S> {
    _phantom: PhantomData<fn() -> S>,
}

impl<S> Default for LoggingNodeMiddleware<S> {
    fn default() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

#[async_trait]
impl<S, K> NodeMiddleware<S, K> for LoggingNodeMiddleware<S>
where
    S: GraphState,
    K: StageId,
{
    async fn around_run(
        &self,
        stage: K,
        state: S,
        inner: NodeInner<S, S::Update>,
    ) -> Result<S::Update, PipelineError> {
        tracing::debug!(stage = %stage, "enter stage");
        let started = Instant::now();
        let result = inner(state).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => tracing::debug!(stage = %stage, elapsed_ms, "exit stage"),
            Err(PipelineError::Interrupted(_)) => {
                tracing::debug!(stage = %stage, elapsed_ms, "stage interrupted")
            }
            Err(e) => tracing::warn!(stage = %stage, elapsed_ms, error = %e, "stage failed"),
        }
        result
    }
}
