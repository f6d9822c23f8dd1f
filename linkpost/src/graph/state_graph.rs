//! State graph builder: nodes, a fixed entry point, fixed edges and routers.
//!
//! Build with [`StateGraph::new`], register stages with [`StateGraph::add_node`], wire them
//! with [`StateGraph::add_edge`] / [`StateGraph::add_conditional_edges`], then
//! [`StateGraph::compile`] into an immutable [`CompiledStateGraph`].

use std::collections::HashMap;
use std::sync::Arc;

use crate::channels::BoxedStateUpdater;
use crate::memory::Checkpointer;

use super::compiled::{CompiledStateGraph, DEFAULT_STEP_LIMIT};
use super::conditional::{ConditionalRouter, ConditionalRouterFn, NextEntry};
use super::{CompilationError, GraphState, Node, NodeMiddleware, Route, StageId};

/// Mutable graph under construction.
///
/// Every stage must have exactly one way out: a fixed edge or a router. Stages without
/// either end the run.
pub struct StateGraph<S: GraphState, K: StageId> {
    nodes: HashMap<K, Arc<dyn Node<S, K>>>,
    entry: Option<K>,
    edges: Vec<(K, Route<K>)>,
    conditional_edges: HashMap<K, ConditionalRouter<S, K>>,
    middleware: Option<Arc<dyn NodeMiddleware<S, K>>>,
    state_updater: Option<BoxedStateUpdater<S>>,
    checkpointer: Option<Arc<dyn Checkpointer<S, K>>>,
    step_limit: usize,
}

impl<S: GraphState, K: StageId> Default for StateGraph<S, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: GraphState, K: StageId> StateGraph<S, K> {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            entry: None,
            edges: Vec::new(),
            conditional_edges: HashMap::new(),
            middleware: None,
            state_updater: None,
            checkpointer: None,
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }

    /// Sets the state updater that merges node updates into the state. Required.
    pub fn with_state_updater(self, updater: BoxedStateUpdater<S>) -> Self {
        Self {
            state_updater: Some(updater),
            ..self
        }
    }

    /// Wraps every node run with `middleware`.
    pub fn with_middleware(self, middleware: Arc<dyn NodeMiddleware<S, K>>) -> Self {
        Self {
            middleware: Some(middleware),
            ..self
        }
    }

    /// Persists suspensions and final states so runs can be resumed by id.
    pub fn with_checkpointer(self, checkpointer: Arc<dyn Checkpointer<S, K>>) -> Self {
        Self {
            checkpointer: Some(checkpointer),
            ..self
        }
    }

    /// Maximum number of stage executions per invoke/resume call.
    pub fn with_step_limit(self, step_limit: usize) -> Self {
        Self { step_limit, ..self }
    }

    /// Registers a node under its own [`Node::id`]. Replaces a node with the same id.
    pub fn add_node(&mut self, node: Arc<dyn Node<S, K>>) -> &mut Self {
        self.nodes.insert(node.id(), node);
        self
    }

    /// Sets the first stage of every fresh run.
    pub fn set_entry_point(&mut self, stage: K) -> &mut Self {
        self.entry = Some(stage);
        self
    }

    /// Adds a fixed edge from `from` to `to`.
    pub fn add_edge(&mut self, from: K, to: impl Into<Route<K>>) -> &mut Self {
        self.edges.push((from, to.into()));
        self
    }

    /// Adds a router after `source`. `targets` must list every route `path` can return.
    pub fn add_conditional_edges(
        &mut self,
        source: K,
        path: ConditionalRouterFn<S, K>,
        targets: Vec<Route<K>>,
    ) -> &mut Self {
        self.conditional_edges
            .insert(source, ConditionalRouter::new(path, targets));
        self
    }

    /// Validates the wiring and builds the executable graph.
    pub fn compile(self) -> Result<CompiledStateGraph<S, K>, CompilationError> {
        let entry = self.entry.ok_or(CompilationError::MissingStart)?;
        if !self.nodes.contains_key(&entry) {
            return Err(CompilationError::NodeNotFound(entry.to_string()));
        }
        let state_updater = self
            .state_updater
            .ok_or(CompilationError::MissingStateUpdater)?;

        let mut next_map: HashMap<K, NextEntry<S, K>> = HashMap::new();
        for (from, to) in &self.edges {
            if !self.nodes.contains_key(from) {
                return Err(CompilationError::NodeNotFound(from.to_string()));
            }
            if let Route::Stage(target) = to {
                if !self.nodes.contains_key(target) {
                    return Err(CompilationError::NodeNotFound(target.to_string()));
                }
            }
            if self.conditional_edges.contains_key(from) {
                return Err(CompilationError::NodeHasBothEdgeAndConditional(
                    from.to_string(),
                ));
            }
            if next_map
                .insert(*from, NextEntry::Unconditional(*to))
                .is_some()
            {
                return Err(CompilationError::DuplicateEdge(from.to_string()));
            }
        }
        for (source, router) in &self.conditional_edges {
            if !self.nodes.contains_key(source) {
                return Err(CompilationError::NodeNotFound(source.to_string()));
            }
            for target in router.targets() {
                if let Route::Stage(stage) = target {
                    if !self.nodes.contains_key(stage) {
                        return Err(CompilationError::InvalidConditionalTarget(
                            stage.to_string(),
                        ));
                    }
                }
            }
            next_map.insert(*source, NextEntry::Conditional(router.clone()));
        }

        let reaches_end = self.nodes.keys().any(|k| match next_map.get(k) {
            None => true,
            Some(entry) => entry.targets().iter().any(Route::is_end),
        });
        if !reaches_end {
            return Err(CompilationError::MissingEnd);
        }

        Ok(CompiledStateGraph {
            nodes: self.nodes,
            entry,
            next_map,
            state_updater,
            middleware: self.middleware,
            checkpointer: self.checkpointer,
            step_limit: self.step_limit,
        })
    }
}
