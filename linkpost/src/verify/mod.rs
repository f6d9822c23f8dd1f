//! Verification fan-out: one concurrent task per link, folded back into a single update.
//!
//! Each task runs on the tokio runtime ([`JoinSet`]) and results are folded in
//! completion order with [`PostStateUpdater::fold`]. The set-valued fields come out the
//! same for any completion order; `page_contents` follows completion order.

mod link_kind;
mod task;

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::collab::{ContentFetcher, RelevancyClassifier};
use crate::state::{PostStateUpdater, PostUpdate, Status};

pub use link_kind::{thumbnail_url, youtube_id, LinkKind};
pub use task::{TaskOutcome, VerifyTask, MAX_SNIPPET_CHARS};

pub struct LinkVerifier {
    task: VerifyTask,
    updater: Arc<PostStateUpdater>,
}

impl LinkVerifier {
    pub fn new(
        fetcher: Arc<dyn ContentFetcher>,
        classifier: Arc<dyn RelevancyClassifier>,
        policy: impl Into<String>,
        updater: Arc<PostStateUpdater>,
    ) -> Self {
        let policy: String = policy.into();
        Self {
            task: VerifyTask {
                fetcher,
                classifier,
                policy: Arc::from(policy),
            },
            updater,
        }
    }

    /// Verifies every link concurrently and returns the merged update with its status.
    pub async fn verify_all(&self, links: &[String], check_relevancy: bool) -> PostUpdate {
        let mut set = JoinSet::new();
        for link in links {
            let task = self.task.clone();
            let link = link.clone();
            set.spawn(async move { task.run(link, check_relevancy).await });
        }

        let mut merged = PostUpdate::default();
        let mut degraded = false;
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(outcome) => {
                    degraded |= outcome.degraded;
                    self.updater.fold(&mut merged, outcome.update);
                }
                Err(e) => warn!(error = %e, "verification task aborted"),
            }
        }

        let status = if degraded {
            Status::VerifyDegraded
        } else if merged.relevant_links.is_empty() {
            Status::NoRelevantLinks
        } else {
            Status::Verified
        };
        info!(
            links = links.len(),
            relevant = merged.relevant_links.len(),
            images = merged.image_candidates.len(),
            status = %status,
            "links verified"
        );
        merged.status = Some(status);
        merged
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::collab::mock::{MockClassifier, MockFetcher};

    fn verifier(fetcher: MockFetcher, classifier: MockClassifier) -> LinkVerifier {
        LinkVerifier::new(
            Arc::new(fetcher),
            Arc::new(classifier),
            "policy",
            Arc::new(PostStateUpdater::default()),
        )
    }

    fn links(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn pages(delays: [u64; 3]) -> MockFetcher {
        MockFetcher::new()
            .with_page_images("https://a.com", "rust a", &["https://a.com/a.png", "https://a.com/logo.png"])
            .with_page_images("https://b.com", "rust b", &["https://b.com/b.jpg"])
            .with_page("https://youtu.be/vid1", "rust video")
            .with_delay("https://a.com", Duration::from_millis(delays[0]))
            .with_delay("https://b.com", Duration::from_millis(delays[1]))
            .with_delay("https://youtu.be/vid1", Duration::from_millis(delays[2]))
    }

    /// **Scenario**: set-merged fields are identical for different completion orders.
    #[tokio::test]
    async fn merge_is_order_independent_for_sets() {
        let input = links(&["https://a.com", "https://b.com", "https://youtu.be/vid1"]);
        let first = verifier(pages([5, 25, 45]), MockClassifier::always(true))
            .verify_all(&input, true)
            .await;
        let second = verifier(pages([45, 25, 5]), MockClassifier::always(true))
            .verify_all(&input, true)
            .await;
        assert_eq!(first.relevant_links, second.relevant_links);
        assert_eq!(first.image_candidates, second.image_candidates);
        assert_eq!(first.relevant_links.len(), 3);
        assert!(first
            .image_candidates
            .contains("https://img.youtube.com/vi/vid1/maxresdefault.jpg"));
        assert!(!first.image_candidates.contains("https://a.com/logo.png"));
        let mut a = first.page_contents.clone();
        let mut b = second.page_contents.clone();
        a.sort();
        b.sort();
        assert_eq!(a, b);
        assert_eq!(first.status, Some(Status::Verified));
    }

    #[tokio::test]
    async fn fetch_failure_and_irrelevant_contribute_nothing() {
        let fetcher = MockFetcher::new()
            .with_failure("https://down.com")
            .with_page("https://off.com", "cooking recipes")
            .with_page("https://on.com", "rust tooling");
        let update = verifier(fetcher, MockClassifier::keyword("rust"))
            .verify_all(&links(&["https://down.com", "https://off.com", "https://on.com"]), true)
            .await;
        assert_eq!(update.relevant_links.len(), 1);
        assert_eq!(update.page_contents, vec!["rust tooling".to_string()]);
        assert_eq!(update.status, Some(Status::Verified));
    }

    /// **Scenario**: an article whose URL contains words blocked for images stays
    /// relevant and keeps its snippet.
    #[tokio::test]
    async fn relevant_article_with_image_words_in_url_is_kept() {
        let article = "https://blog.google/products/pixel/pixel-9-ai-features/";
        let fetcher = MockFetcher::new()
            .with_page_images(article, "Pixel 9 brings AI features", &["https://blog.google/img/pixel-logo.png"])
            .with_page("https://example.com/issue-tracking-guide", "tracking issues in rust");
        let update = verifier(fetcher, MockClassifier::always(true))
            .verify_all(
                &links(&[article, "https://example.com/issue-tracking-guide"]),
                true,
            )
            .await;
        assert!(update.relevant_links.contains(article));
        assert!(update
            .relevant_links
            .contains("https://example.com/issue-tracking-guide"));
        assert_eq!(update.page_contents.len(), 2);
        assert!(update.image_candidates.is_empty());
        assert_eq!(update.status, Some(Status::Verified));
    }

    /// **Scenario**: a non-web link is neither fetched nor allowed to add content.
    #[tokio::test]
    async fn non_web_link_contributes_nothing() {
        let fetcher = Arc::new(
            MockFetcher::new()
                .with_page("javascript:void(0)", "script")
                .with_page("https://a.com", "rust"),
        );
        let verifier = LinkVerifier::new(
            fetcher.clone(),
            Arc::new(MockClassifier::always(true)),
            "policy",
            Arc::new(PostStateUpdater::default()),
        );
        let update = verifier
            .verify_all(&links(&["javascript:void(0)", "https://a.com"]), true)
            .await;
        assert_eq!(update.page_contents, vec!["rust".to_string()]);
        assert_eq!(update.relevant_links.len(), 1);
        assert_eq!(fetcher.calls(), vec!["https://a.com".to_string()]);
    }

    #[tokio::test]
    async fn classifier_failure_degrades() {
        let fetcher = MockFetcher::new().with_page("https://a.com", "text");
        let update = verifier(fetcher, MockClassifier::failing())
            .verify_all(&links(&["https://a.com"]), true)
            .await;
        assert!(update.relevant_links.is_empty());
        assert_eq!(update.status, Some(Status::VerifyDegraded));
    }

    #[tokio::test]
    async fn skipped_check_counts_fetched_links_as_relevant() {
        let classifier = Arc::new(MockClassifier::always(false));
        let verifier = LinkVerifier::new(
            Arc::new(MockFetcher::new().with_page("https://a.com", "anything")),
            classifier.clone(),
            "policy",
            Arc::new(PostStateUpdater::default()),
        );
        let update = verifier.verify_all(&links(&["https://a.com"]), false).await;
        assert_eq!(update.relevant_links.len(), 1);
        assert_eq!(classifier.calls(), 0);
    }

    #[tokio::test]
    async fn no_links_means_no_relevant_links() {
        let update = verifier(MockFetcher::new(), MockClassifier::always(true))
            .verify_all(&[], true)
            .await;
        assert_eq!(update.status, Some(Status::NoRelevantLinks));
    }
}
