use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::PipelineError;
use crate::graph::{GraphInterrupt, Interrupt, Node, Route};
use crate::review::{dispatch, ReviewPayload};
use crate::state::{PostState, PostUpdate, Stage};

/// Suspension point.
///
/// Without a pending response the stage interrupts the run with a [`ReviewPayload`].
/// When resumed, the injected response is dispatched into `next` for the review router.
pub struct HumanReviewNode {
    post_limit: usize,
}

impl HumanReviewNode {
    pub fn new(post_limit: usize) -> Self {
        Self { post_limit }
    }
}

#[async_trait]
impl Node<PostState, Stage> for HumanReviewNode {
    fn id(&self) -> Stage {
        Stage::HumanReview
    }

    async fn run(&self, state: PostState) -> Result<PostUpdate, PipelineError> {
        if state.post.trim().is_empty() {
            debug!("nothing to review");
            return Ok(PostUpdate {
                next: Some(Some(Route::End)),
                pending_response: Some(None),
                ..PostUpdate::default()
            });
        }
        if let Some(response) = &state.pending_response {
            info!(response = response.kind(), "review response received");
            return Ok(dispatch(response));
        }
        let payload = serde_json::to_value(ReviewPayload::from_state(&state, self.post_limit))
            .map_err(|e| PipelineError::ExecutionFailed(format!("review payload: {}", e)))?;
        Err(PipelineError::Interrupted(GraphInterrupt(Interrupt::with_id(
            payload,
            Stage::HumanReview.as_str(),
        ))))
    }
}
