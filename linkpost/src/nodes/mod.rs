//! Pipeline stages. Each node reads a [`PostState`](crate::state::PostState) snapshot,
//! may call one collaborator, and returns a [`PostUpdate`](crate::state::PostUpdate).
//!
//! No stage fails the run because a collaborator failed: every failure becomes a
//! fallback value plus a distinguishing [`Status`](crate::state::Status).

mod check_links;
mod condense_post;
mod generate_post;
mod generate_report;
mod human_review;
mod rewrite_post;
mod schedule_post;
mod unknown_response;
mod update_schedule;
mod verify_links;

use std::sync::Arc;

use chrono::{DateTime, Utc};

pub use check_links::CheckLinksNode;
pub use condense_post::CondensePostNode;
pub use generate_post::GeneratePostNode;
pub use generate_report::GenerateReportNode;
pub use human_review::HumanReviewNode;
pub use rewrite_post::RewritePostNode;
pub use schedule_post::SchedulePostNode;
pub use unknown_response::{UnknownResponseNode, UNKNOWN_RESPONSE_NOTE};
pub use update_schedule::UpdateScheduleNode;
pub use verify_links::VerifyLinksNode;

/// Source of "now" for schedule validation.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(Utc::now)
}

/// Generated text, or `None` when the answer is blank.
pub(crate) fn non_blank(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == text.len() {
        Some(text)
    } else {
        Some(trimmed.to_string())
    }
}
