//! Publisher that logs instead of posting.

use async_trait::async_trait;
use tracing::info;

use super::{AuthStatus, CollabError, Platform, PublishRequest, PublishResult, Publisher};

/// Reports every post as successful without contacting a platform.
#[derive(Debug, Clone, Default)]
pub struct DryRunPublisher;

#[async_trait]
impl Publisher for DryRunPublisher {
    async fn auth_check(&self, _platform: Platform) -> Result<AuthStatus, CollabError> {
        Ok(AuthStatus {
            authorized: true,
            detail: Some("dry run".to_string()),
        })
    }

    async fn post(
        &self,
        platform: Platform,
        request: &PublishRequest,
    ) -> Result<PublishResult, CollabError> {
        info!(
            platform = %platform,
            schedule = %request.schedule,
            organization = request.organization,
            has_image = request.image_url.is_some(),
            chars = request.text.chars().count(),
            "dry-run publish"
        );
        Ok(PublishResult {
            platform,
            success: true,
            post_id: Some(format!("dry-run-{}", uuid::Uuid::new_v4())),
            post_url: None,
            error: None,
        })
    }
}
