use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::collab::TextGenerator;
use crate::error::PipelineError;
use crate::graph::Node;
use crate::prompts;
use crate::state::{CondenseRetries, PostState, PostUpdate, Stage, Status, StructuredPost};

use super::non_blank;

/// Writes the post body from the report and appends the primary link.
pub struct GeneratePostNode {
    generator: Arc<dyn TextGenerator>,
    post_limit: usize,
}

impl GeneratePostNode {
    pub fn new(generator: Arc<dyn TextGenerator>, post_limit: usize) -> Self {
        Self {
            generator,
            post_limit,
        }
    }
}

#[async_trait]
impl Node<PostState, Stage> for GeneratePostNode {
    fn id(&self) -> Stage {
        Stage::GeneratePost
    }

    async fn run(&self, state: PostState) -> Result<PostUpdate, PipelineError> {
        let link = state.primary_link().unwrap_or_default().to_string();
        let prompt = prompts::post_prompt(&state.report, &link, self.post_limit);
        let body = match self.generator.generate(&prompt).await.map(non_blank) {
            Ok(Some(body)) => body,
            Ok(None) | Err(_) => {
                warn!("post generation failed, leaving the post empty");
                return Ok(PostUpdate {
                    post: Some(String::new()),
                    structured_post: Some(None),
                    status: Some(Status::PostGenerationFailed),
                    ..PostUpdate::default()
                });
            }
        };

        let image_url = if state.config.text_only_mode {
            None
        } else {
            state.image_candidates.iter().next().cloned()
        };
        let update = PostUpdate {
            image_url: Some(image_url),
            condense_count: Some(CondenseRetries::default()),
            status: Some(Status::PostGenerated),
            ..PostUpdate::default()
        }
        .with_post(StructuredPost { body, url: link });
        info!(
            chars = update.post.as_deref().map(|p| p.chars().count()).unwrap_or(0),
            limit = self.post_limit,
            "post generated"
        );
        Ok(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::mock::MockGenerator;
    use crate::state::PipelineConfig;

    fn state(text_only: bool) -> PostState {
        PostState {
            config: PipelineConfig {
                text_only_mode: text_only,
                ..PipelineConfig::default()
            },
            links: vec!["https://a.com".into()],
            relevant_links: ["https://a.com".to_string()].into(),
            image_candidates: ["https://a.com/hero.png".to_string()].into(),
            report: "report".into(),
            condense_count: CondenseRetries::from(2),
            ..PostState::default()
        }
    }

    #[tokio::test]
    async fn composes_body_and_link() {
        let node = GeneratePostNode::new(Arc::new(MockGenerator::fixed("Read this")), 280);
        let u = node.run(state(false)).await.unwrap();
        assert_eq!(u.post.as_deref(), Some("Read this\n\nhttps://a.com"));
        assert_eq!(u.image_url, Some(Some("https://a.com/hero.png".into())));
        assert_eq!(u.condense_count, Some(CondenseRetries::default()));
        assert_eq!(u.status, Some(Status::PostGenerated));
    }

    #[tokio::test]
    async fn text_only_has_no_image() {
        let node = GeneratePostNode::new(Arc::new(MockGenerator::fixed("Read this")), 280);
        let u = node.run(state(true)).await.unwrap();
        assert_eq!(u.image_url, Some(None));
    }

    #[tokio::test]
    async fn failure_leaves_empty_post() {
        let node = GeneratePostNode::new(Arc::new(MockGenerator::failing()), 280);
        let u = node.run(state(false)).await.unwrap();
        assert_eq!(u.post.as_deref(), Some(""));
        assert_eq!(u.status, Some(Status::PostGenerationFailed));
    }
}
