//! Pipeline assembly and driver.
//!
//! [`Pipeline::new`] wires the ten stages, the routers of [`crate::route`] and the
//! fixed edges into a [`CompiledStateGraph`]. The graph for `links → post`:
//!
//! ```text
//! check_links ─▶ verify_links ─▶ generate_report ─▶ generate_post ─▶ human_review
//!                                                    │    ▲ ▲            │
//!                                                    ▼    │ │            ├─▶ schedule_post ─▶ end
//!                                              condense_post │           ├─▶ rewrite_post (→ condense / review)
//!                                                            │           ├─▶ update_schedule ─┐
//!                                                            └───────────┴─▶ unknown_response ┴─▶ human_review
//! ```
//!
//! Every conditional stage may also end the run.

use std::str::FromStr;
use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::collab::{
    BasicDateParser, ContentFetcher, DateParser, DryRunPublisher, HttpFetcher,
    LlmRelevancyClassifier, OpenAiGenerator, Platform, Publisher, RelevancyClassifier,
    TextGenerator,
};
use crate::dedup::LinkCache;
use crate::error::PipelineError;
use crate::graph::{
    CompilationError, CompiledStateGraph, ConditionalRouterFn, LoggingNodeMiddleware, Route,
    RunOutcome, StateGraph, DEFAULT_STEP_LIMIT,
};
use crate::memory::{Checkpoint, CheckpointListItem, Checkpointer};
use crate::nodes::{
    system_clock, CheckLinksNode, Clock, CondensePostNode, GeneratePostNode, GenerateReportNode,
    HumanReviewNode, RewritePostNode, SchedulePostNode, UnknownResponseNode, UpdateScheduleNode,
    VerifyLinksNode,
};
use crate::prompts::DEFAULT_RELEVANCY_POLICY;
use crate::review::{parse_response, HumanResponse};
use crate::route;
use crate::state::{PipelineConfig, PostState, PostStateUpdater, Stage};
use crate::verify::LinkVerifier;

/// Platform character limit of a post.
pub const DEFAULT_POST_LIMIT: usize = 280;

pub type PipelineGraph = CompiledStateGraph<PostState, Stage>;
pub type PipelineOutcome = RunOutcome<PostState, Stage>;
pub type PipelineCheckpointer = Arc<dyn Checkpointer<PostState, Stage>>;

/// External collaborators used by the stages.
#[derive(Clone)]
pub struct Collaborators {
    pub fetcher: Arc<dyn ContentFetcher>,
    pub classifier: Arc<dyn RelevancyClassifier>,
    pub generator: Arc<dyn TextGenerator>,
    pub publisher: Arc<dyn Publisher>,
    pub date_parser: Arc<dyn DateParser>,
    pub clock: Clock,
}

impl Collaborators {
    /// HTTP fetcher, OpenAI generator and classifier from the environment, dry-run
    /// publisher, basic date parser, system clock.
    pub fn from_env() -> Self {
        let generator: Arc<dyn TextGenerator> = Arc::new(OpenAiGenerator::from_env());
        Self {
            fetcher: Arc::new(HttpFetcher::new()),
            classifier: Arc::new(LlmRelevancyClassifier::new(generator.clone())),
            generator,
            publisher: Arc::new(DryRunPublisher),
            date_parser: Arc::new(BasicDateParser::new()),
            clock: system_clock(),
        }
    }
}

/// Driver settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Post length limit in Unicode scalar values.
    pub post_limit: usize,
    pub step_limit: usize,
    pub relevancy_policy: String,
    pub platforms: Vec<Platform>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            post_limit: DEFAULT_POST_LIMIT,
            step_limit: DEFAULT_STEP_LIMIT,
            relevancy_policy: DEFAULT_RELEVANCY_POLICY.to_string(),
            platforms: vec![Platform::Twitter, Platform::LinkedIn],
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => match raw.trim().parse() {
            Ok(v) => v,
            Err(_) => {
                warn!(var = name, value = %raw, "ignoring invalid value");
                default
            }
        },
        _ => default,
    }
}

impl PipelineSettings {
    /// Defaults overridden by `LINKPOST_POST_LIMIT`, `LINKPOST_STEP_LIMIT`,
    /// `LINKPOST_PLATFORMS` and `LINKPOST_RELEVANCY_POLICY`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let platforms = match std::env::var("LINKPOST_PLATFORMS") {
            Ok(raw) if !raw.trim().is_empty() => parse_platforms(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "ignoring LINKPOST_PLATFORMS");
                defaults.platforms.clone()
            }),
            _ => defaults.platforms.clone(),
        };
        Self {
            post_limit: env_or("LINKPOST_POST_LIMIT", defaults.post_limit),
            step_limit: env_or("LINKPOST_STEP_LIMIT", defaults.step_limit),
            relevancy_policy: env_or("LINKPOST_RELEVANCY_POLICY", defaults.relevancy_policy),
            platforms,
        }
    }
}

/// Comma-separated platform list, e.g. `twitter,linkedin`.
pub fn parse_platforms(raw: &str) -> Result<Vec<Platform>, String> {
    let mut platforms = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let platform: Platform = part.parse()?;
        if !platforms.contains(&platform) {
            platforms.push(platform);
        }
    }
    Ok(platforms)
}

fn router(f: fn(&PostState) -> Route<Stage>) -> ConditionalRouterFn<PostState, Stage> {
    Arc::new(f)
}

/// Builds the compiled pipeline graph.
pub fn build_graph(
    collab: &Collaborators,
    cache: Arc<LinkCache>,
    settings: &PipelineSettings,
    checkpointer: Option<PipelineCheckpointer>,
) -> Result<PipelineGraph, CompilationError> {
    let updater = Arc::new(PostStateUpdater::default());
    let verifier = LinkVerifier::new(
        collab.fetcher.clone(),
        collab.classifier.clone(),
        settings.relevancy_policy.clone(),
        updater.clone(),
    );
    let limit = settings.post_limit;

    let mut graph = StateGraph::<PostState, Stage>::new()
        .with_state_updater(updater)
        .with_middleware(Arc::new(LoggingNodeMiddleware::<PostState>::default()))
        .with_step_limit(settings.step_limit);
    if let Some(cp) = checkpointer {
        graph = graph.with_checkpointer(cp);
    }

    graph
        .add_node(Arc::new(CheckLinksNode::new(cache.clone())))
        .add_node(Arc::new(VerifyLinksNode::new(verifier)))
        .add_node(Arc::new(GenerateReportNode::new(collab.generator.clone())))
        .add_node(Arc::new(GeneratePostNode::new(collab.generator.clone(), limit)))
        .add_node(Arc::new(CondensePostNode::new(collab.generator.clone(), limit)))
        .add_node(Arc::new(HumanReviewNode::new(limit)))
        .add_node(Arc::new(RewritePostNode::new(collab.generator.clone(), limit)))
        .add_node(Arc::new(UpdateScheduleNode::new(
            collab.date_parser.clone(),
            collab.clock.clone(),
        )))
        .add_node(Arc::new(UnknownResponseNode))
        .add_node(Arc::new(SchedulePostNode::new(
            collab.publisher.clone(),
            cache,
            settings.platforms.clone(),
        )));

    let after_post: ConditionalRouterFn<PostState, Stage> =
        Arc::new(move |s: &PostState| route::after_post(s, limit));
    let post_targets = vec![
        Route::Stage(Stage::CondensePost),
        Route::Stage(Stage::HumanReview),
        Route::End,
    ];

    graph
        .set_entry_point(Stage::CheckLinks)
        .add_conditional_edges(
            Stage::CheckLinks,
            router(route::after_check_links),
            vec![Route::Stage(Stage::VerifyLinks), Route::End],
        )
        .add_conditional_edges(
            Stage::VerifyLinks,
            router(route::after_verify_links),
            vec![Route::Stage(Stage::GenerateReport), Route::End],
        )
        .add_conditional_edges(
            Stage::GenerateReport,
            router(route::after_generate_report),
            vec![Route::Stage(Stage::GeneratePost), Route::End],
        )
        .add_conditional_edges(Stage::GeneratePost, after_post.clone(), post_targets.clone())
        .add_conditional_edges(Stage::CondensePost, after_post.clone(), post_targets.clone())
        .add_conditional_edges(Stage::RewritePost, after_post, post_targets)
        .add_conditional_edges(
            Stage::HumanReview,
            router(route::after_human_review),
            route::HUMAN_REVIEW_TARGETS.to_vec(),
        )
        .add_edge(Stage::UpdateSchedule, Stage::HumanReview)
        .add_edge(Stage::UnknownResponse, Stage::HumanReview)
        .add_edge(Stage::SchedulePost, Route::End);

    graph.compile()
}

/// The link → post pipeline.
pub struct Pipeline {
    graph: PipelineGraph,
    cache: Arc<LinkCache>,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(
        collab: Collaborators,
        cache: Arc<LinkCache>,
        checkpointer: Option<PipelineCheckpointer>,
        settings: PipelineSettings,
    ) -> Result<Self, CompilationError> {
        let graph = build_graph(&collab, cache.clone(), &settings, checkpointer)?;
        Ok(Self {
            graph,
            cache,
            settings,
        })
    }

    /// Starts a run. Returns when the run completes or pauses for review.
    pub async fn start(
        &self,
        links: Vec<String>,
        config: PipelineConfig,
        run_id: Option<String>,
    ) -> Result<PipelineOutcome, PipelineError> {
        let run_id = run_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let links: Vec<String> = links
            .into_iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        info!(run_id = %run_id, links = links.len(), "starting pipeline");
        self.graph
            .invoke(PostState::new(links, config), run_id)
            .await
    }

    /// Resumes a suspended run with a reviewer response of any shape.
    pub async fn resume(&self, run_id: &str, response: &Value) -> Result<PipelineOutcome, PipelineError> {
        self.resume_with(run_id, parse_response(response)).await
    }

    /// Resumes a suspended run with an already typed response.
    pub async fn resume_with(
        &self,
        run_id: &str,
        response: HumanResponse,
    ) -> Result<PipelineOutcome, PipelineError> {
        info!(run_id, response = response.kind(), "resuming pipeline");
        self.graph
            .resume(run_id, move |state: &mut PostState| {
                state.pending_response = Some(response);
            })
            .await
    }

    /// Latest checkpoint of a run.
    pub async fn state(&self, run_id: &str) -> Result<Option<Checkpoint<PostState, Stage>>, PipelineError> {
        self.graph.get_state(run_id).await
    }

    pub async fn history(
        &self,
        run_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<CheckpointListItem>, PipelineError> {
        self.graph.get_state_history(run_id, limit).await
    }

    pub fn graph(&self) -> &PipelineGraph {
        &self.graph
    }

    pub fn cache(&self) -> &Arc<LinkCache> {
        &self.cache
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::mock::{MockClassifier, MockDateParser, MockFetcher, MockGenerator, MockPublisher};
    use crate::graph::generate_text;

    fn collab() -> Collaborators {
        Collaborators {
            fetcher: Arc::new(MockFetcher::new()),
            classifier: Arc::new(MockClassifier::always(true)),
            generator: Arc::new(MockGenerator::fixed("text")),
            publisher: Arc::new(MockPublisher::new()),
            date_parser: Arc::new(MockDateParser::new()),
            clock: system_clock(),
        }
    }

    #[test]
    fn graph_compiles_with_every_stage() {
        let graph = build_graph(
            &collab(),
            Arc::new(LinkCache::disabled()),
            &PipelineSettings::default(),
            None,
        )
        .unwrap();
        assert_eq!(graph.stages().len(), Stage::ALL.len());
        assert_eq!(graph.entry(), Stage::CheckLinks);
        assert_eq!(
            graph.routes_from(Stage::SchedulePost),
            vec![Route::End]
        );
        assert_eq!(
            graph.routes_from(Stage::UpdateSchedule),
            vec![Route::Stage(Stage::HumanReview)]
        );
        let text = generate_text(&graph);
        assert!(text.contains("Entry: check_links"));
    }

    #[test]
    fn platform_list_parsing() {
        assert_eq!(
            parse_platforms("linkedin, x ,twitter").unwrap(),
            vec![Platform::LinkedIn, Platform::Twitter]
        );
        assert!(parse_platforms("twitter,myspace").is_err());
    }

    #[test]
    fn default_settings() {
        let s = PipelineSettings::default();
        assert_eq!(s.post_limit, 280);
        assert_eq!(s.step_limit, 64);
        assert_eq!(s.platforms.len(), 2);
    }
}
