use std::fmt;

use crate::channels::{Channel, FilteredSet, LastValue, StateUpdater, Topic, UrlFilter};

use super::{image_filter, link_filter, PostState, PostUpdate};

fn keep_last<T>(acc: &mut Option<T>, next: Option<T>) {
    if next.is_some() {
        *acc = next;
    }
}

/// Applies [`PostState::merge_policies`] to partial updates.
///
/// Used by the graph after every stage, and by the verification fan-out to fold the
/// outputs of concurrent tasks into one update.
pub struct PostStateUpdater {
    links: FilteredSet,
    images: FilteredSet,
}

impl PostStateUpdater {
    pub fn new(link_filter: UrlFilter, image_filter: UrlFilter) -> Self {
        Self {
            links: FilteredSet::new(link_filter),
            images: FilteredSet::new(image_filter),
        }
    }

    /// Folds `next` into the pending update `acc` with the same per-field policies used
    /// for the state, so folding tasks then applying once equals applying each task.
    pub fn fold(&self, acc: &mut PostUpdate, next: PostUpdate) {
        keep_last(&mut acc.links, next.links);
        keep_last(&mut acc.duplicate_links, next.duplicate_links);
        Topic.merge(&mut acc.page_contents, next.page_contents);
        self.links.merge(&mut acc.relevant_links, next.relevant_links);
        self.images
            .merge(&mut acc.image_candidates, next.image_candidates);
        keep_last(&mut acc.image_url, next.image_url);
        keep_last(&mut acc.report, next.report);
        keep_last(&mut acc.post, next.post);
        keep_last(&mut acc.structured_post, next.structured_post);
        keep_last(&mut acc.schedule, next.schedule);
        keep_last(&mut acc.feedback, next.feedback);
        keep_last(&mut acc.condense_count, next.condense_count);
        keep_last(&mut acc.next, next.next);
        keep_last(&mut acc.pending_response, next.pending_response);
        keep_last(&mut acc.publish_results, next.publish_results);
        keep_last(&mut acc.status, next.status);
    }
}

impl Default for PostStateUpdater {
    fn default() -> Self {
        Self::new(link_filter(), image_filter())
    }
}

impl fmt::Debug for PostStateUpdater {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostStateUpdater").finish_non_exhaustive()
    }
}

impl StateUpdater<PostState> for PostStateUpdater {
    fn apply_update(&self, current: &mut PostState, update: PostUpdate) {
        LastValue.merge_present(&mut current.links, update.links);
        LastValue.merge_present(&mut current.duplicate_links, update.duplicate_links);
        Topic.merge(&mut current.page_contents, update.page_contents);
        self.links
            .merge(&mut current.relevant_links, update.relevant_links);
        self.images
            .merge(&mut current.image_candidates, update.image_candidates);
        LastValue.merge_present(&mut current.image_url, update.image_url);
        LastValue.merge_present(&mut current.report, update.report);
        LastValue.merge_present(&mut current.post, update.post);
        LastValue.merge_present(&mut current.structured_post, update.structured_post);
        LastValue.merge_present(&mut current.schedule, update.schedule);
        LastValue.merge_present(&mut current.feedback, update.feedback);
        LastValue.merge_present(&mut current.condense_count, update.condense_count);
        LastValue.merge_present(&mut current.next, update.next);
        LastValue.merge_present(&mut current.pending_response, update.pending_response);
        LastValue.merge_present(&mut current.publish_results, update.publish_results);
        LastValue.merge_present(&mut current.status, update.status);
    }
}
