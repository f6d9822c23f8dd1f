use async_trait::async_trait;
use tracing::debug;

use crate::error::PipelineError;
use crate::graph::Node;
use crate::state::{PostState, PostUpdate, Stage, Status};

/// Shown to the reviewer after a response that could not be understood.
pub const UNKNOWN_RESPONSE_NOTE: &str = "The previous response was not understood. \
Reply with accept, ignore, edit feedback, or a new schedule date.";

/// Clears transient fields before looping back to review.
pub struct UnknownResponseNode;

#[async_trait]
impl Node<PostState, Stage> for UnknownResponseNode {
    fn id(&self) -> Stage {
        Stage::UnknownResponse
    }

    async fn run(&self, _state: PostState) -> Result<PostUpdate, PipelineError> {
        debug!("unrecognized review response");
        Ok(PostUpdate {
            pending_response: Some(None),
            next: Some(None),
            feedback: Some(Some(UNKNOWN_RESPONSE_NOTE.to_string())),
            status: Some(Status::UnknownResponse),
            ..PostUpdate::default()
        })
    }
}
