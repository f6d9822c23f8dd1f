//! Human review: the suspension payload, response parsing and dispatch.
//!
//! The review stage pauses the run with a [`ReviewPayload`]; the caller resumes it with
//! any JSON value, which [`parse_response`] turns into a [`HumanResponse`]. [`dispatch`]
//! maps the response to the state update that the review router reads.

mod payload;
mod response;

use crate::graph::Route;
use crate::state::{PostUpdate, Stage, Status};

pub use payload::{AllowedActions, PostPreview, ReviewPayload, REVIEW_ACTION};
pub use response::{parse_response, parse_response_text, HumanResponse, ResponseArgs};

/// State update for a reviewer response. Always consumes the pending response.
pub fn dispatch(response: &HumanResponse) -> PostUpdate {
    let mut update = PostUpdate {
        pending_response: Some(None),
        ..PostUpdate::default()
    };
    let next = match response {
        HumanResponse::Accept => {
            update.feedback = Some(None);
            Route::Stage(Stage::SchedulePost)
        }
        HumanResponse::Edit { feedback } => {
            update.feedback = Some(Some(feedback.clone()));
            Route::Stage(Stage::RewritePost)
        }
        HumanResponse::Ignore => {
            update.status = Some(Status::Ignored);
            Route::End
        }
        HumanResponse::Respond(args) => {
            if let Some(date) = args.schedule_change() {
                update.feedback = Some(Some(date.to_string()));
                Route::Stage(Stage::UpdateSchedule)
            } else if let Some(text) = args.content_change() {
                update.feedback = Some(Some(text.to_string()));
                Route::Stage(Stage::RewritePost)
            } else {
                Route::Stage(Stage::UnknownResponse)
            }
        }
        HumanResponse::Unclassified => Route::Stage(Stage::UnknownResponse),
    };
    update.next = Some(Some(next));
    update
}
