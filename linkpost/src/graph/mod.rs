//! Typed state graph: build with [`StateGraph`], run with [`CompiledStateGraph`].
//!
//! A graph is generic over the state type `S` (implementing [`GraphState`]) and a stage
//! key `K` (an exhaustive enum implementing [`StageId`]). Nodes return partial updates
//! (`S::Update`) which the graph's [`StateUpdater`](crate::channels::StateUpdater) merges
//! into the state; routers then pick the next [`Route`].
//!
//! A node can pause the run by returning [`PipelineError::Interrupted`](crate::error::PipelineError::Interrupted);
//! the compiled graph saves a [`Checkpoint`](crate::memory::Checkpoint) and returns
//! [`RunOutcome::Suspended`]. [`CompiledStateGraph::resume`] re-enters at the paused stage.

mod compile_error;
mod compiled;
mod conditional;
mod interrupt;
mod logging;
mod logging_middleware;
mod node;
mod node_middleware;
mod outcome;
mod route;
mod state_graph;
mod visualization;

use std::fmt::{Debug, Display};
use std::hash::Hash;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use compile_error::CompilationError;
pub use compiled::{CompiledStateGraph, DEFAULT_STEP_LIMIT};
pub use conditional::{ConditionalRouter, ConditionalRouterFn, NextEntry};
pub use interrupt::{GraphInterrupt, Interrupt};
pub use logging::{
    log_graph_complete, log_graph_error, log_graph_start, log_graph_suspended, log_node_complete,
    log_node_start, log_node_state, log_route,
};
pub use logging_middleware::LoggingNodeMiddleware;
pub use node::Node;
pub use node_middleware::{NodeFuture, NodeInner, NodeMiddleware};
pub use outcome::{RunOutcome, Suspension};
pub use route::Route;
pub use state_graph::StateGraph;
pub use visualization::{generate_dot, generate_text};

/// State carried through a graph.
///
/// Nodes receive a clone of the state and return a partial [`Update`](GraphState::Update);
/// the graph's state updater folds the update in with per-field merge policies.
pub trait GraphState: Clone + Send + Sync + Debug + 'static {
    /// Partial update returned by nodes.
    type Update: Send + Debug + 'static;
}

/// Stage identifier: a small `Copy` enum naming every node of a graph.
pub trait StageId:
    Copy + Eq + Hash + Ord + Debug + Display + Send + Sync + Serialize + DeserializeOwned + 'static
{
}

impl<T> StageId for T where
    T: Copy + Eq + Hash + Ord + Debug + Display + Send + Sync + Serialize + DeserializeOwned + 'static
{
}
