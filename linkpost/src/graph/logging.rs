//! Logging helpers for graph execution.
//!
//! Stage-level events are `debug!`; run start, suspension and completion are `info!`.

use std::fmt::{Debug, Display};

/// Log stage execution start.
pub fn log_node_start(stage: &dyn Display) {
    tracing::debug!(stage = %stage, "Starting stage execution");
}

/// Log the input state of a stage.
pub fn log_node_state<S: Debug>(stage: &dyn Display, state: &S) {
    tracing::trace!(stage = %stage, state = ?state, "Stage execution: state");
}

/// Log stage completion after its update was merged.
pub fn log_node_complete(stage: &dyn Display) {
    tracing::debug!(stage = %stage, "Stage execution complete; state updated");
}

/// Log a routing decision.
pub fn log_route(from: &dyn Display, to: &dyn Display) {
    tracing::debug!(from = %from, to = %to, "Routing");
}

/// Log run start or re-entry.
pub fn log_graph_start(run_id: &str, entry: &dyn Display) {
    tracing::info!(run_id, entry = %entry, "Starting graph execution");
}

/// Log a run pausing for external input.
pub fn log_graph_suspended(run_id: &str, stage: &dyn Display, checkpoint_id: &str) {
    tracing::info!(run_id, stage = %stage, checkpoint_id, "Graph execution suspended");
}

/// Log run completion.
pub fn log_graph_complete(run_id: &str, steps: usize) {
    tracing::info!(run_id, steps, "Graph execution complete");
}

/// Log a run failing with an engine error.
pub fn log_graph_error(run_id: &str, error: &crate::error::PipelineError) {
    tracing::error!(run_id, error = %error, "Graph execution error");
}
