use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::dedup::LinkCache;
use crate::error::PipelineError;
use crate::graph::Node;
use crate::state::{CondenseRetries, PostState, PostUpdate, Stage, Status};

/// Drops links found in the dedup cache.
pub struct CheckLinksNode {
    cache: Arc<LinkCache>,
}

impl CheckLinksNode {
    pub fn new(cache: Arc<LinkCache>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl Node<PostState, Stage> for CheckLinksNode {
    fn id(&self) -> Stage {
        Stage::CheckLinks
    }

    async fn run(&self, state: PostState) -> Result<PostUpdate, PipelineError> {
        if state.config.skip_dedup_check || state.links.is_empty() {
            debug!(skip = state.config.skip_dedup_check, links = state.links.len(), "dedup check skipped");
            return Ok(PostUpdate::status(Status::LinksChecked));
        }
        let (new, duplicates) = self.cache.check_usage(&state.links).await;
        info!(new = new.len(), duplicates = duplicates.len(), "links checked against cache");
        let status = if new.is_empty() {
            Status::NoNewLinks
        } else {
            Status::LinksChecked
        };
        Ok(PostUpdate {
            links: Some(new),
            duplicate_links: Some(duplicates),
            condense_count: Some(CondenseRetries::default()),
            status: Some(status),
            ..PostUpdate::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use crate::state::PipelineConfig;

    async fn cache_with(used: &[&str]) -> Arc<LinkCache> {
        let cache = LinkCache::new(Arc::new(InMemoryStore::new()));
        let used: Vec<String> = used.iter().map(|s| s.to_string()).collect();
        cache.put(&used).await.unwrap();
        Arc::new(cache)
    }

    #[tokio::test]
    async fn filters_cached_links() {
        let node = CheckLinksNode::new(cache_with(&["https://used.com"]).await);
        let state = PostState::new(
            vec!["https://used.com".into(), "https://new.com".into()],
            PipelineConfig::default(),
        );
        let u = node.run(state).await.unwrap();
        assert_eq!(u.links, Some(vec!["https://new.com".to_string()]));
        assert_eq!(u.duplicate_links, Some(vec!["https://used.com".to_string()]));
        assert_eq!(u.condense_count, Some(CondenseRetries::default()));
        assert_eq!(u.status, Some(Status::LinksChecked));
    }

    #[tokio::test]
    async fn all_cached_is_no_new_links() {
        let node = CheckLinksNode::new(cache_with(&["https://used.com"]).await);
        let state = PostState::new(vec!["https://used.com".into()], PipelineConfig::default());
        let u = node.run(state).await.unwrap();
        assert_eq!(u.links, Some(vec![]));
        assert_eq!(u.status, Some(Status::NoNewLinks));
    }

    #[tokio::test]
    async fn skip_flag_keeps_links() {
        let node = CheckLinksNode::new(cache_with(&["https://used.com"]).await);
        let config = PipelineConfig {
            skip_dedup_check: true,
            ..PipelineConfig::default()
        };
        let u = node
            .run(PostState::new(vec!["https://used.com".into()], config))
            .await
            .unwrap();
        assert_eq!(u.links, None);
    }
}
