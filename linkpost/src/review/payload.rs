use serde::Serialize;

use crate::state::PostState;

/// Action name of the review payload.
pub const REVIEW_ACTION: &str = "review_post";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPreview {
    pub content: String,
    pub character_count: usize,
    pub within_limit: bool,
    pub source_link: Option<String>,
    pub has_image: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub scheduled_for: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AllowedActions {
    pub accept: bool,
    pub edit: bool,
    pub ignore: bool,
    pub respond: bool,
}

impl Default for AllowedActions {
    fn default() -> Self {
        Self {
            accept: true,
            edit: true,
            ignore: true,
            respond: true,
        }
    }
}

/// What the reviewer sees while the run is suspended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPayload {
    pub action: String,
    pub post: PostPreview,
    pub instructions: String,
    pub allowed_actions: AllowedActions,
}

impl ReviewPayload {
    pub fn from_state(state: &PostState, limit: usize) -> Self {
        let character_count = state.post_len();
        let within_limit = character_count <= limit;

        let mut instructions = String::from(
            "Review the post. Accept to schedule it, edit with feedback to rewrite it, \
             respond with a new date to reschedule it, or ignore to drop it.",
        );
        if !within_limit {
            instructions.push_str(&format!(
                "\n\nThe post is {} characters, over the {} character limit.",
                character_count, limit
            ));
        }
        if let Some(note) = state.feedback.as_deref().filter(|f| !f.trim().is_empty()) {
            instructions.push_str("\n\nNote: ");
            instructions.push_str(note);
        }

        Self {
            action: REVIEW_ACTION.to_string(),
            post: PostPreview {
                content: state.post.clone(),
                character_count,
                within_limit,
                source_link: state.primary_link().map(str::to_string),
                has_image: state.image_url.is_some(),
                image_url: state.image_url.clone(),
                scheduled_for: state.schedule.describe(),
            },
            instructions,
            allowed_actions: AllowedActions::default(),
        }
    }
}
