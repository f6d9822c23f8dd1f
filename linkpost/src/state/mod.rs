//! Pipeline state schema: [`PostState`], its partial update [`PostUpdate`], and the
//! per-field merge policies applied by [`PostStateUpdater`].

mod blacklist;
mod stage;
mod updater;

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::channels::MergePolicy;
use crate::collab::PublishResult;
use crate::graph::{GraphState, Route};
use crate::review::HumanResponse;
use crate::schedule::Schedule;

pub use blacklist::{image_filter, is_allowed_image_url, is_allowed_link, link_filter};
pub use stage::Stage;
pub use updater::PostStateUpdater;

/// Upper bound of the condense retry counter.
pub const MAX_CONDENSE_RETRIES: u8 = 3;

/// Invocation flags. Travel in state so a resumed run keeps the original config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineConfig {
    pub skip_dedup_check: bool,
    pub skip_relevancy_check: bool,
    pub text_only_mode: bool,
    pub post_to_organization_account: bool,
}

/// Post text split into body and link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredPost {
    pub body: String,
    pub url: String,
}

impl StructuredPost {
    /// Full post text: body, blank line, link. The link is not repeated when the body
    /// already contains it.
    pub fn compose(&self) -> String {
        let body = self.body.trim();
        if self.url.is_empty() || body.contains(&self.url) {
            body.to_string()
        } else if body.is_empty() {
            self.url.clone()
        } else {
            format!("{}\n\n{}", body, self.url)
        }
    }
}

/// Condense retry counter, clamped to `0..=MAX_CONDENSE_RETRIES`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct CondenseRetries(u8);

impl CondenseRetries {
    pub fn get(self) -> u8 {
        self.0
    }

    /// One more attempt, saturating at the maximum.
    pub fn increment(self) -> Self {
        Self((self.0 + 1).min(MAX_CONDENSE_RETRIES))
    }

    pub fn is_exhausted(self) -> bool {
        self.0 >= MAX_CONDENSE_RETRIES
    }
}

impl From<u8> for CondenseRetries {
    fn from(n: u8) -> Self {
        Self(n.min(MAX_CONDENSE_RETRIES))
    }
}

impl From<CondenseRetries> for u8 {
    fn from(c: CondenseRetries) -> Self {
        c.0
    }
}

/// Observability status of the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Pending,
    LinksChecked,
    NoNewLinks,
    Verified,
    VerifyDegraded,
    NoRelevantLinks,
    ReportGenerated,
    ReportFallback,
    PostGenerated,
    PostGenerationFailed,
    PostCondensed,
    CondenseFailed,
    PostRewritten,
    RewriteFailed,
    ScheduleUpdated,
    ScheduleInvalid,
    UnknownResponse,
    Ignored,
    Published,
    PublishFailed,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::String(s)) => f.write_str(&s),
            _ => write!(f, "{:?}", self),
        }
    }
}

/// The single source of truth passed between stages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostState {
    pub config: PipelineConfig,
    /// Input links; replaced by the new links after the dedup check.
    pub links: Vec<String>,
    pub duplicate_links: Vec<String>,
    /// Page text snippets, appended without dedup.
    pub page_contents: Vec<String>,
    pub relevant_links: BTreeSet<String>,
    pub image_candidates: BTreeSet<String>,
    pub image_url: Option<String>,
    pub report: String,
    pub post: String,
    pub structured_post: Option<StructuredPost>,
    pub schedule: Schedule,
    /// Pending user feedback: rewrite instructions, a schedule date, or a message for
    /// the reviewer.
    pub feedback: Option<String>,
    pub condense_count: CondenseRetries,
    /// Decision of the human-review stage.
    pub next: Option<Route<Stage>>,
    /// Response injected on resume; consumed by the human-review stage.
    pub pending_response: Option<HumanResponse>,
    pub publish_results: Vec<PublishResult>,
    pub status: Status,
}

impl PostState {
    /// Fresh state for a new run.
    pub fn new(links: Vec<String>, config: PipelineConfig) -> Self {
        Self {
            links,
            config,
            ..Self::default()
        }
    }

    /// Post length in Unicode scalar values.
    pub fn post_len(&self) -> usize {
        self.post.chars().count()
    }

    /// Primary source link: the first input link that was found relevant. Falls back to
    /// any relevant link, then to the first input link.
    pub fn primary_link(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|l| self.relevant_links.contains(*l))
            .or_else(|| self.relevant_links.iter().next())
            .or_else(|| self.links.first())
            .map(String::as_str)
    }

    /// Merge policy of every field, by serialized field name.
    pub fn merge_policies() -> &'static [(&'static str, MergePolicy)] {
        &[
            ("config", MergePolicy::Overwrite),
            ("links", MergePolicy::Overwrite),
            ("duplicateLinks", MergePolicy::Overwrite),
            ("pageContents", MergePolicy::Append),
            ("relevantLinks", MergePolicy::UnionFiltered),
            ("imageCandidates", MergePolicy::UnionFiltered),
            ("imageUrl", MergePolicy::Overwrite),
            ("report", MergePolicy::Overwrite),
            ("post", MergePolicy::Overwrite),
            ("structuredPost", MergePolicy::Overwrite),
            ("schedule", MergePolicy::Overwrite),
            ("feedback", MergePolicy::Overwrite),
            ("condenseCount", MergePolicy::Overwrite),
            ("next", MergePolicy::Overwrite),
            ("pendingResponse", MergePolicy::Overwrite),
            ("publishResults", MergePolicy::Overwrite),
            ("status", MergePolicy::Overwrite),
        ]
    }
}

impl GraphState for PostState {
    type Update = PostUpdate;
}

/// Partial update returned by stages.
///
/// Overwrite fields are `Option`s where `None` leaves the field unchanged; clearing an
/// optional field is `Some(None)`. `page_contents` is appended, the two sets are unioned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostUpdate {
    pub links: Option<Vec<String>>,
    pub duplicate_links: Option<Vec<String>>,
    pub page_contents: Vec<String>,
    pub relevant_links: BTreeSet<String>,
    pub image_candidates: BTreeSet<String>,
    pub image_url: Option<Option<String>>,
    pub report: Option<String>,
    pub post: Option<String>,
    pub structured_post: Option<Option<StructuredPost>>,
    pub schedule: Option<Schedule>,
    pub feedback: Option<Option<String>>,
    pub condense_count: Option<CondenseRetries>,
    pub next: Option<Option<Route<Stage>>>,
    pub pending_response: Option<Option<HumanResponse>>,
    pub publish_results: Option<Vec<PublishResult>>,
    pub status: Option<Status>,
}

impl PostUpdate {
    /// Update that only sets the status.
    pub fn status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Sets the post text together with its body/link split.
    pub fn with_post(mut self, post: StructuredPost) -> Self {
        self.post = Some(post.compose());
        self.structured_post = Some(Some(post));
        self
    }
}
