//! Routers: pure functions from [`PostState`] to the next [`Route`].

use crate::graph::Route;
use crate::state::{PostState, Stage};

type R = Route<Stage>;

/// After the dedup check. Skipping the check, or an empty input, goes on to
/// verification; a check that leaves no new links ends the run.
pub fn after_check_links(state: &PostState) -> R {
    if state.config.skip_dedup_check || (state.links.is_empty() && state.duplicate_links.is_empty()) {
        return Route::Stage(Stage::VerifyLinks);
    }
    if state.links.is_empty() {
        Route::End
    } else {
        Route::Stage(Stage::VerifyLinks)
    }
}

pub fn after_verify_links(state: &PostState) -> R {
    if state.relevant_links.is_empty() {
        Route::End
    } else {
        Route::Stage(Stage::GenerateReport)
    }
}

pub fn after_generate_report(state: &PostState) -> R {
    if state.report.trim().is_empty() {
        Route::End
    } else {
        Route::Stage(Stage::GeneratePost)
    }
}

/// After generating, condensing or rewriting the post.
///
/// Over the limit with retries left → condense. Over the limit with retries exhausted
/// still goes to review.
pub fn after_post(state: &PostState, limit: usize) -> R {
    if state.post.trim().is_empty() {
        return Route::End;
    }
    if state.post_len() > limit && !state.condense_count.is_exhausted() {
        Route::Stage(Stage::CondensePost)
    } else {
        Route::Stage(Stage::HumanReview)
    }
}

/// Targets the review stage may dispatch to.
pub const HUMAN_REVIEW_TARGETS: [R; 5] = [
    Route::Stage(Stage::SchedulePost),
    Route::Stage(Stage::RewritePost),
    Route::Stage(Stage::UpdateSchedule),
    Route::Stage(Stage::UnknownResponse),
    Route::End,
];

/// Dispatch on the decision recorded by the review stage. Anything unexpected goes to
/// the unknown-response stage.
pub fn after_human_review(state: &PostState) -> R {
    if state.post.trim().is_empty() {
        return Route::End;
    }
    match state.next {
        Some(route) if HUMAN_REVIEW_TARGETS.contains(&route) => route,
        _ => Route::Stage(Stage::UnknownResponse),
    }
}
