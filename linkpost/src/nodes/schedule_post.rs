use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::collab::{Platform, PublishRequest, PublishResult, Publisher};
use crate::dedup::LinkCache;
use crate::error::PipelineError;
use crate::graph::Node;
use crate::state::{PostState, PostUpdate, Stage, Status};

/// Publishes to every configured platform and records the links as used when at least
/// one platform accepted the post.
pub struct SchedulePostNode {
    publisher: Arc<dyn Publisher>,
    cache: Arc<LinkCache>,
    platforms: Vec<Platform>,
}

impl SchedulePostNode {
    pub fn new(publisher: Arc<dyn Publisher>, cache: Arc<LinkCache>, platforms: Vec<Platform>) -> Self {
        Self {
            publisher,
            cache,
            platforms,
        }
    }

    async fn publish_to(&self, platform: Platform, request: &PublishRequest) -> PublishResult {
        match self.publisher.auth_check(platform).await {
            Ok(auth) if auth.authorized => {}
            Ok(auth) => {
                let detail = auth.detail.unwrap_or_else(|| "not authorized".to_string());
                return PublishResult::failed(platform, format!("not authorized: {}", detail));
            }
            Err(e) => return PublishResult::failed(platform, e.to_string()),
        }
        match self.publisher.post(platform, request).await {
            Ok(result) => result,
            Err(e) => PublishResult::failed(platform, e.to_string()),
        }
    }
}

#[async_trait]
impl Node<PostState, Stage> for SchedulePostNode {
    fn id(&self) -> Stage {
        Stage::SchedulePost
    }

    async fn run(&self, state: PostState) -> Result<PostUpdate, PipelineError> {
        let request = PublishRequest {
            text: state.post.clone(),
            image_url: if state.config.text_only_mode {
                None
            } else {
                state.image_url.clone()
            },
            schedule: state.schedule,
            organization: state.config.post_to_organization_account,
        };

        let mut results = Vec::with_capacity(self.platforms.len());
        for platform in &self.platforms {
            let result = self.publish_to(*platform, &request).await;
            if result.success {
                info!(platform = %platform, post_id = ?result.post_id, "published");
            } else {
                warn!(platform = %platform, error = ?result.error, "publish failed");
            }
            results.push(result);
        }

        let published = results.iter().any(|r| r.success);
        if published {
            if let Err(e) = self.cache.put(&state.links).await {
                warn!(error = %e, "could not record used links");
            }
        }
        Ok(PostUpdate {
            publish_results: Some(results),
            status: Some(if published {
                Status::Published
            } else {
                Status::PublishFailed
            }),
            ..PostUpdate::default()
        })
    }
}
