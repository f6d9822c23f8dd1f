//! Compiled state graph: immutable, supports invoke and resume.
//!
//! The run loop: run the current stage (through middleware) → merge its update with the
//! state updater → resolve the next route → repeat until the terminal route. When a
//! stage returns [`PipelineError::Interrupted`], the loop saves a paused checkpoint
//! (before merging anything from that stage) and returns [`RunOutcome::Suspended`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::channels::BoxedStateUpdater;
use crate::error::PipelineError;
use crate::memory::{Checkpoint, CheckpointListItem, CheckpointSource, Checkpointer};

use super::conditional::NextEntry;
use super::logging::{
    log_graph_complete, log_graph_error, log_graph_start, log_graph_suspended, log_node_complete,
    log_node_start, log_node_state, log_route,
};
use super::{GraphInterrupt, GraphState, Node, NodeMiddleware, Route, RunOutcome, StageId, Suspension};

/// Default maximum number of stage executions per invoke/resume call.
pub const DEFAULT_STEP_LIMIT: usize = 64;

/// Executable graph produced by [`StateGraph::compile`](super::StateGraph::compile).
pub struct CompiledStateGraph<S: GraphState, K: StageId> {
    pub(super) nodes: HashMap<K, Arc<dyn Node<S, K>>>,
    pub(super) entry: K,
    pub(super) next_map: HashMap<K, NextEntry<S, K>>,
    pub(super) state_updater: BoxedStateUpdater<S>,
    pub(super) middleware: Option<Arc<dyn NodeMiddleware<S, K>>>,
    pub(super) checkpointer: Option<Arc<dyn Checkpointer<S, K>>>,
    pub(super) step_limit: usize,
}

impl<S: GraphState, K: StageId> fmt::Debug for CompiledStateGraph<S, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledStateGraph")
            .field("entry", &self.entry)
            .field("stages", &self.stages())
            .field("step_limit", &self.step_limit)
            .field("checkpointer", &self.checkpointer.is_some())
            .finish_non_exhaustive()
    }
}

impl<S: GraphState, K: StageId> CompiledStateGraph<S, K> {
    /// Starts a fresh run at the entry point.
    pub async fn invoke(
        &self,
        state: S,
        run_id: impl Into<String>,
    ) -> Result<RunOutcome<S, K>, PipelineError> {
        let run_id = run_id.into();
        self.run_loop(state, run_id, self.entry, 0).await
    }

    /// Resumes the latest checkpoint of `run_id`.
    ///
    /// `inject` writes the external response into the saved state before the paused
    /// stage runs again. Fails with [`PipelineError::RunNotFound`] when the run has no
    /// checkpoint and [`PipelineError::NotSuspended`] when its latest checkpoint is not
    /// paused.
    pub async fn resume<F>(&self, run_id: &str, inject: F) -> Result<RunOutcome<S, K>, PipelineError>
    where
        F: FnOnce(&mut S) + Send,
    {
        let checkpoint = self
            .get_state(run_id)
            .await?
            .ok_or_else(|| PipelineError::RunNotFound(run_id.to_string()))?;
        self.resume_from(checkpoint, inject).await
    }

    /// Resumes from a checkpoint the caller already holds (e.g. from a [`Suspension`]).
    pub async fn resume_from<F>(
        &self,
        checkpoint: Checkpoint<S, K>,
        inject: F,
    ) -> Result<RunOutcome<S, K>, PipelineError>
    where
        F: FnOnce(&mut S) + Send,
    {
        let stage = checkpoint
            .paused_stage
            .ok_or_else(|| PipelineError::NotSuspended(checkpoint.run_id.clone()))?;
        let mut state = checkpoint.state;
        inject(&mut state);
        self.run_loop(state, checkpoint.run_id, stage, checkpoint.metadata.step)
            .await
    }

    /// Latest checkpoint of `run_id`, if a checkpointer is configured and has one.
    pub async fn get_state(&self, run_id: &str) -> Result<Option<Checkpoint<S, K>>, PipelineError> {
        match &self.checkpointer {
            Some(cp) => Ok(cp.get_latest(run_id).await?),
            None => Err(PipelineError::ExecutionFailed(
                "graph was compiled without a checkpointer".into(),
            )),
        }
    }

    /// Checkpoint history of `run_id`, oldest first.
    pub async fn get_state_history(
        &self,
        run_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<CheckpointListItem>, PipelineError> {
        match &self.checkpointer {
            Some(cp) => Ok(cp.list(run_id, limit).await?),
            None => Ok(Vec::new()),
        }
    }

    /// Registered stages, sorted.
    pub fn stages(&self) -> Vec<K> {
        let mut stages: Vec<K> = self.nodes.keys().copied().collect();
        stages.sort();
        stages
    }

    pub fn entry(&self) -> K {
        self.entry
    }

    /// Outgoing routes of `stage`; empty routes end the run.
    pub fn routes_from(&self, stage: K) -> Vec<Route<K>> {
        match self.next_map.get(&stage) {
            Some(entry) => entry.targets(),
            None => vec![Route::End],
        }
    }

    async fn run_loop(
        &self,
        mut state: S,
        run_id: String,
        mut current: K,
        mut step: i64,
    ) -> Result<RunOutcome<S, K>, PipelineError> {
        log_graph_start(&run_id, &current);
        let mut executed = 0usize;
        loop {
            if executed >= self.step_limit {
                let err = PipelineError::StepLimitExceeded(self.step_limit);
                log_graph_error(&run_id, &err);
                return Err(err);
            }
            executed += 1;

            let node = match self.nodes.get(&current) {
                Some(n) => n.clone(),
                None => {
                    let err = PipelineError::ExecutionFailed(format!(
                        "stage not registered: {}",
                        current
                    ));
                    log_graph_error(&run_id, &err);
                    return Err(err);
                }
            };
            log_node_start(&current);
            log_node_state(&current, &state);

            let update = match self.run_node(current, node, state.clone()).await {
                Ok(update) => update,
                Err(PipelineError::Interrupted(GraphInterrupt(interrupt))) => {
                    let checkpoint = Checkpoint::new(
                        run_id.clone(),
                        state,
                        Some(current),
                        CheckpointSource::Suspend,
                        step,
                    );
                    self.save(&checkpoint).await?;
                    log_graph_suspended(&run_id, &current, &checkpoint.id);
                    return Ok(RunOutcome::Suspended(Suspension {
                        checkpoint,
                        payload: interrupt.value,
                    }));
                }
                Err(e) => {
                    log_graph_error(&run_id, &e);
                    return Err(e);
                }
            };
            self.state_updater.apply_update(&mut state, update);
            step += 1;
            log_node_complete(&current);

            let next = match self.next_map.get(&current) {
                Some(NextEntry::Unconditional(route)) => *route,
                Some(NextEntry::Conditional(router)) => {
                    let route = router.resolve_next(&state);
                    if !router.allows(&route) {
                        let err = PipelineError::ExecutionFailed(format!(
                            "router after {} returned undeclared route {}",
                            current, route
                        ));
                        log_graph_error(&run_id, &err);
                        return Err(err);
                    }
                    route
                }
                None => Route::End,
            };
            log_route(&current, &next);

            match next {
                Route::Stage(stage) => current = stage,
                Route::End => {
                    let checkpoint = Checkpoint::new(
                        run_id.clone(),
                        state,
                        None,
                        CheckpointSource::Complete,
                        step,
                    );
                    self.save(&checkpoint).await?;
                    log_graph_complete(&run_id, executed);
                    return Ok(RunOutcome::Completed(checkpoint.state));
                }
            }
        }
    }

    async fn run_node(
        &self,
        stage: K,
        node: Arc<dyn Node<S, K>>,
        state: S,
    ) -> Result<S::Update, PipelineError> {
        match &self.middleware {
            Some(mw) => {
                mw.around_run(
                    stage,
                    state,
                    Box::new(move |s| Box::pin(async move { node.run(s).await })),
                )
                .await
            }
            None => node.run(state).await,
        }
    }

    async fn save(&self, checkpoint: &Checkpoint<S, K>) -> Result<(), PipelineError> {
        if let Some(cp) = &self.checkpointer {
            cp.put(checkpoint).await?;
        }
        Ok(())
    }
}
