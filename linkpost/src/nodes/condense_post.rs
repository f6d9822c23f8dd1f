use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::collab::TextGenerator;
use crate::error::PipelineError;
use crate::graph::Node;
use crate::prompts;
use crate::state::{PostState, PostUpdate, Stage, Status};

use super::non_blank;

/// Shortens an over-limit post. Counts an attempt whether or not it succeeds.
pub struct CondensePostNode {
    generator: Arc<dyn TextGenerator>,
    post_limit: usize,
}

impl CondensePostNode {
    pub fn new(generator: Arc<dyn TextGenerator>, post_limit: usize) -> Self {
        Self {
            generator,
            post_limit,
        }
    }
}

#[async_trait]
impl Node<PostState, Stage> for CondensePostNode {
    fn id(&self) -> Stage {
        Stage::CondensePost
    }

    async fn run(&self, state: PostState) -> Result<PostUpdate, PipelineError> {
        let attempt = state.condense_count.increment();
        let prompt = prompts::condense_prompt(&state.post, self.post_limit, state.post_len());
        let mut update = PostUpdate {
            condense_count: Some(attempt),
            ..PostUpdate::default()
        };
        match self.generator.generate(&prompt).await.map(non_blank) {
            Ok(Some(post)) => {
                info!(
                    attempt = attempt.get(),
                    from = state.post_len(),
                    to = post.chars().count(),
                    "post condensed"
                );
                update.post = Some(post);
                update.structured_post = Some(None);
                update.status = Some(Status::PostCondensed);
            }
            Ok(None) | Err(_) => {
                warn!(attempt = attempt.get(), "condense failed, keeping post");
                update.status = Some(Status::CondenseFailed);
            }
        }
        Ok(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::mock::MockGenerator;
    use crate::prompts::PromptKind;
    use crate::state::CondenseRetries;

    /// **Scenario**: a 320-char post condensed to 260 chars with the counter at 1.
    #[tokio::test]
    async fn condenses_and_counts() {
        let generator = MockGenerator::fixed("unused").with(PromptKind::Condense, "b".repeat(260));
        let node = CondensePostNode::new(Arc::new(generator), 280);
        let state = PostState {
            post: "a".repeat(320),
            ..PostState::default()
        };
        let u = node.run(state).await.unwrap();
        assert_eq!(u.post.map(|p| p.chars().count()), Some(260));
        assert_eq!(u.condense_count, Some(CondenseRetries::from(1)));
        assert_eq!(u.status, Some(Status::PostCondensed));
    }

    #[tokio::test]
    async fn failure_still_counts() {
        let node = CondensePostNode::new(Arc::new(MockGenerator::failing()), 280);
        let state = PostState {
            post: "a".repeat(320),
            condense_count: CondenseRetries::from(2),
            ..PostState::default()
        };
        let u = node.run(state).await.unwrap();
        assert_eq!(u.post, None);
        assert_eq!(u.condense_count, Some(CondenseRetries::from(3)));
        assert_eq!(u.status, Some(Status::CondenseFailed));
    }
}
