//! One verification task: fetch, classify, contribute.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::collab::{ContentFetcher, RelevancyClassifier};
use crate::state::{is_allowed_link, PostUpdate};

use super::link_kind::{thumbnail_url, LinkKind};

/// Longest page snippet kept in state, in chars.
pub const MAX_SNIPPET_CHARS: usize = 4_000;

/// Contribution of one link.
#[derive(Debug, Default)]
pub struct TaskOutcome {
    pub update: PostUpdate,
    /// The classifier failed and the link was counted as not relevant.
    pub degraded: bool,
}

pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[derive(Clone)]
pub struct VerifyTask {
    pub(super) fetcher: Arc<dyn ContentFetcher>,
    pub(super) classifier: Arc<dyn RelevancyClassifier>,
    pub(super) policy: Arc<str>,
}

impl VerifyTask {
    /// Never fails: a link that is not a web page, or whose fetch fails, contributes
    /// nothing.
    pub async fn run(&self, link: String, check_relevancy: bool) -> TaskOutcome {
        if !is_allowed_link(&link) {
            warn!(link = %link, "not an http(s) link, skipped");
            return TaskOutcome::default();
        }
        let kind = LinkKind::classify(&link);
        let page = match self.fetcher.fetch(&link).await {
            Ok(page) => page,
            Err(e) => {
                warn!(link = %link, error = %e, "fetch failed, link skipped");
                return TaskOutcome::default();
            }
        };
        let snippet = truncate_chars(page.content.trim(), MAX_SNIPPET_CHARS);

        let mut degraded = false;
        let relevant = if check_relevancy {
            match self.classifier.is_relevant(&snippet, &self.policy).await {
                Ok(relevant) => relevant,
                Err(e) => {
                    warn!(link = %link, error = %e, "relevancy check failed, counting link as not relevant");
                    degraded = true;
                    false
                }
            }
        } else {
            true
        };
        debug!(link = %link, rich = kind.is_rich(), relevant, "link verified");
        if !relevant {
            return TaskOutcome {
                update: PostUpdate::default(),
                degraded,
            };
        }

        let image_candidates: BTreeSet<String> = match &kind {
            LinkKind::Video { id } => BTreeSet::from([thumbnail_url(id)]),
            LinkKind::General => page.image_urls.into_iter().collect(),
        };
        TaskOutcome {
            update: PostUpdate {
                relevant_links: BTreeSet::from([link]),
                page_contents: vec![snippet],
                image_candidates,
                ..PostUpdate::default()
            },
            degraded,
        }
    }
}
