//! State updater: merges a node's partial update into the state.
//!
//! Implement [`StateUpdater`] for a state type to give each field its own merge policy
//! (see [`Channel`](super::Channel)), or wrap a closure with [`FieldBasedUpdater`].

use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::graph::GraphState;

/// Merges partial updates into the state after each stage.
pub trait StateUpdater<S: GraphState>: Send + Sync + Debug {
    /// Apply `update` to `current`.
    fn apply_update(&self, current: &mut S, update: S::Update);
}

/// State updater backed by a closure.
pub struct FieldBasedUpdater<S, F> {
    updater_fn: F,
    _marker: PhantomData<fn() -> S>,
}

impl<S, F> Debug for FieldBasedUpdater<S, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldBasedUpdater")
            .field("updater_fn", &"<function>")
            .finish()
    }
}

impl<S, F> FieldBasedUpdater<S, F>
where
    S: GraphState,
    F: Fn(&mut S, S::Update) + Send + Sync + 'static,
{
    pub fn new(updater_fn: F) -> Self {
        Self {
            updater_fn,
            _marker: PhantomData,
        }
    }
}

impl<S, F> StateUpdater<S> for FieldBasedUpdater<S, F>
where
    S: GraphState,
    F: Fn(&mut S, S::Update) + Send + Sync + 'static,
{
    fn apply_update(&self, current: &mut S, update: S::Update) {
        (self.updater_fn)(current, update);
    }
}

/// Shared, type-erased state updater.
pub type BoxedStateUpdater<S> = Arc<dyn StateUpdater<S>>;
