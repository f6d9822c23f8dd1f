//! Node middleware: wrap node.run with external async logic (around pattern).
//!
//! Set via [`StateGraph::with_middleware`](super::StateGraph::with_middleware).

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;

use crate::error::PipelineError;

use super::{GraphState, StageId};

/// Future returned by a node run.
pub type NodeFuture<U> = Pin<Box<dyn Future<Output = Result<U, PipelineError>> + Send>>;

/// The wrapped node call handed to middleware.
pub type NodeInner<S, U> = Box<dyn FnOnce(S) -> NodeFuture<U> + Send>;

/// Async middleware that wraps every node run.
///
/// Implementations decide when to call `inner`, and may inspect or replace its result.
#[async_trait]
pub trait NodeMiddleware<S, K>: Send + Sync
where
    S: GraphState,
    K: StageId,
{
    /// Wraps one node run.
    ///
    /// - `stage`: the stage about to run
    /// - `state`: state passed to the node
    /// - `inner`: the actual node call; must be invoked to execute the node
    async fn around_run(
        &self,
        stage: K,
        state: S,
        inner: NodeInner<S, S::Update>,
    ) -> Result<S::Update, PipelineError>;
}
