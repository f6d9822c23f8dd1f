use async_trait::async_trait;

use crate::error::PipelineError;
use crate::graph::Node;
use crate::state::{PostState, PostUpdate, Stage};
use crate::verify::LinkVerifier;

/// Fans out over the links; see [`LinkVerifier`].
pub struct VerifyLinksNode {
    verifier: LinkVerifier,
}

impl VerifyLinksNode {
    pub fn new(verifier: LinkVerifier) -> Self {
        Self { verifier }
    }
}

#[async_trait]
impl Node<PostState, Stage> for VerifyLinksNode {
    fn id(&self) -> Stage {
        Stage::VerifyLinks
    }

    async fn run(&self, state: PostState) -> Result<PostUpdate, PipelineError> {
        Ok(self
            .verifier
            .verify_all(&state.links, !state.config.skip_relevancy_check)
            .await)
    }
}
