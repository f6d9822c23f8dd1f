use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::collab::TextGenerator;
use crate::error::PipelineError;
use crate::graph::Node;
use crate::prompts;
use crate::state::{CondenseRetries, PostState, PostUpdate, Stage, Status};

use super::non_blank;

/// Rewrites the post from reviewer feedback.
pub struct RewritePostNode {
    generator: Arc<dyn TextGenerator>,
    post_limit: usize,
}

impl RewritePostNode {
    pub fn new(generator: Arc<dyn TextGenerator>, post_limit: usize) -> Self {
        Self {
            generator,
            post_limit,
        }
    }
}

#[async_trait]
impl Node<PostState, Stage> for RewritePostNode {
    fn id(&self) -> Stage {
        Stage::RewritePost
    }

    async fn run(&self, state: PostState) -> Result<PostUpdate, PipelineError> {
        let feedback = state.feedback.clone().unwrap_or_default();
        let prompt = prompts::rewrite_prompt(&state.post, &feedback, self.post_limit);
        match self.generator.generate(&prompt).await.map(non_blank) {
            Ok(Some(post)) => {
                info!(chars = post.chars().count(), "post rewritten");
                Ok(PostUpdate {
                    post: Some(post),
                    structured_post: Some(None),
                    feedback: Some(None),
                    condense_count: Some(CondenseRetries::default()),
                    status: Some(Status::PostRewritten),
                    ..PostUpdate::default()
                })
            }
            Ok(None) | Err(_) => {
                warn!("rewrite failed, keeping post");
                Ok(PostUpdate {
                    feedback: Some(Some(
                        "The rewrite failed; the post is unchanged.".to_string(),
                    )),
                    status: Some(Status::RewriteFailed),
                    ..PostUpdate::default()
                })
            }
        }
    }
}
