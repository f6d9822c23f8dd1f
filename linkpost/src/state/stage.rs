use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Every stage of the link → post pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    CheckLinks,
    VerifyLinks,
    GenerateReport,
    GeneratePost,
    CondensePost,
    HumanReview,
    RewritePost,
    UpdateSchedule,
    UnknownResponse,
    SchedulePost,
}

impl Stage {
    pub const ALL: [Stage; 10] = [
        Stage::CheckLinks,
        Stage::VerifyLinks,
        Stage::GenerateReport,
        Stage::GeneratePost,
        Stage::CondensePost,
        Stage::HumanReview,
        Stage::RewritePost,
        Stage::UpdateSchedule,
        Stage::UnknownResponse,
        Stage::SchedulePost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::CheckLinks => "check_links",
            Stage::VerifyLinks => "verify_links",
            Stage::GenerateReport => "generate_report",
            Stage::GeneratePost => "generate_post",
            Stage::CondensePost => "condense_post",
            Stage::HumanReview => "human_review",
            Stage::RewritePost => "rewrite_post",
            Stage::UpdateSchedule => "update_schedule",
            Stage::UnknownResponse => "unknown_response",
            Stage::SchedulePost => "schedule_post",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| format!("unknown stage: {}", s))
    }
}
