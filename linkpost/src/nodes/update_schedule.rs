use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::collab::DateParser;
use crate::error::PipelineError;
use crate::graph::Node;
use crate::state::{PostState, PostUpdate, Stage, Status};

use super::Clock;

/// Applies the requested date from `feedback`. Invalid dates leave the schedule as is and
/// put the error into `feedback` for the next review.
pub struct UpdateScheduleNode {
    parser: Arc<dyn DateParser>,
    clock: Clock,
}

impl UpdateScheduleNode {
    pub fn new(parser: Arc<dyn DateParser>, clock: Clock) -> Self {
        Self { parser, clock }
    }
}

#[async_trait]
impl Node<PostState, Stage> for UpdateScheduleNode {
    fn id(&self) -> Stage {
        Stage::UpdateSchedule
    }

    async fn run(&self, state: PostState) -> Result<PostUpdate, PipelineError> {
        let requested = state.feedback.as_deref().unwrap_or_default();
        let now = (self.clock)();
        match self
            .parser
            .parse(requested, now)
            .and_then(|schedule| schedule.validate(now))
        {
            Ok(schedule) => {
                info!(schedule = %schedule, "schedule updated");
                Ok(PostUpdate {
                    schedule: Some(schedule),
                    feedback: Some(None),
                    status: Some(Status::ScheduleUpdated),
                    ..PostUpdate::default()
                })
            }
            Err(e) => {
                warn!(requested, error = %e, "schedule change rejected");
                Ok(PostUpdate {
                    feedback: Some(Some(e.to_string())),
                    status: Some(Status::ScheduleInvalid),
                    ..PostUpdate::default()
                })
            }
        }
    }
}
