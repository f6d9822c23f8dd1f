//! Conditional edges: route to the next stage based on state.
//!
//! A source stage has a router function that takes the updated state and returns a
//! [`Route`]. The router declares its possible targets up front so the graph can
//! validate them at compile time and render them in visualizations.

use std::fmt;
use std::sync::Arc;

use super::{Route, StageId};

/// Router function: pure function of the state returning the next route.
pub type ConditionalRouterFn<S, K> = Arc<dyn Fn(&S) -> Route<K> + Send + Sync>;

/// Conditional edge definition: routing function plus its declared targets.
#[derive(Clone)]
pub struct ConditionalRouter<S, K> {
    pub(super) path: ConditionalRouterFn<S, K>,
    pub(super) targets: Vec<Route<K>>,
}

impl<S, K: StageId> ConditionalRouter<S, K> {
    /// Builds a router. `targets` lists every route `path` may return.
    pub fn new(path: ConditionalRouterFn<S, K>, targets: Vec<Route<K>>) -> Self {
        Self { path, targets }
    }

    /// Resolves the next route from the current state.
    pub fn resolve_next(&self, state: &S) -> Route<K> {
        (self.path)(state)
    }

    /// Routes this router is declared to return.
    pub fn targets(&self) -> &[Route<K>] {
        &self.targets
    }

    /// Whether `route` is one of the declared targets.
    pub fn allows(&self, route: &Route<K>) -> bool {
        self.targets.contains(route)
    }
}

impl<S, K: fmt::Debug> fmt::Debug for ConditionalRouter<S, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionalRouter")
            .field("targets", &self.targets)
            .finish_non_exhaustive()
    }
}

/// How to determine the next stage after a given stage runs.
///
/// Stages with one outgoing edge use `Unconditional`; stages with a router use
/// `Conditional` and resolve at runtime from the merged state.
#[derive(Clone, Debug)]
pub enum NextEntry<S, K> {
    /// Single fixed next stage (or the terminal route).
    Unconditional(Route<K>),
    /// Next stage is decided by the router from state.
    Conditional(ConditionalRouter<S, K>),
}

impl<S, K: StageId> NextEntry<S, K> {
    /// All routes this entry can produce.
    pub fn targets(&self) -> Vec<Route<K>> {
        match self {
            NextEntry::Unconditional(r) => vec![*r],
            NextEntry::Conditional(router) => router.targets().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn router_resolves_from_state() {
        let router: ConditionalRouter<i32, u8> = ConditionalRouter::new(
            Arc::new(|s: &i32| if *s > 0 { Route::Stage(1) } else { Route::End }),
            vec![Route::Stage(1), Route::End],
        );
        assert_eq!(router.resolve_next(&5), Route::Stage(1));
        assert_eq!(router.resolve_next(&0), Route::End);
        assert!(router.allows(&Route::End));
        assert!(!router.allows(&Route::Stage(2)));
    }

    #[test]
    fn next_entry_targets() {
        let fixed: NextEntry<i32, u8> = NextEntry::Unconditional(Route::Stage(4));
        assert_eq!(fixed.targets(), vec![Route::Stage(4)]);
    }
}
