//! # linkpost
//!
//! Turns a set of links into a published social media post through a resumable,
//! multi-stage pipeline with a human review step.
//!
//! - [`graph`]: typed state graph engine (stages, routers, middleware, suspend/resume).
//! - [`channels`]: per-field merge policies and the [`StateUpdater`](channels::StateUpdater) seam.
//! - [`memory`]: checkpointers (in-memory, SQLite) and the long-term key/value store.
//! - [`state`]: the pipeline state schema and its partial update.
//! - [`dedup`]: cross-run cache of used links.
//! - [`verify`]: concurrent per-link verification.
//! - [`route`]: pure routers between stages.
//! - [`review`]: review payload, response parsing and dispatch.
//! - [`nodes`]: the ten pipeline stages.
//! - [`collab`]: collaborator traits, real adapters and test doubles.
//! - [`pipeline`]: assembly and driver.
//!
//! ```no_run
//! use std::sync::Arc;
//! use linkpost::{Collaborators, LinkCache, Pipeline, PipelineConfig, PipelineSettings, PostState, Stage};
//! use linkpost::memory::{InMemoryStore, MemorySaver};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let cache = Arc::new(LinkCache::new(Arc::new(InMemoryStore::new())));
//! let pipeline = Pipeline::new(
//!     Collaborators::from_env(),
//!     cache,
//!     Some(Arc::new(MemorySaver::<PostState, Stage>::new())),
//!     PipelineSettings::from_env(),
//! )?;
//! let outcome = pipeline
//!     .start(vec!["https://example.com/post".into()], PipelineConfig::default(), None)
//!     .await?;
//! if let Some(suspension) = outcome.suspended() {
//!     pipeline.resume(suspension.run_id(), &serde_json::json!("accept")).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod channels;
pub mod collab;
pub mod dedup;
pub mod error;
pub mod graph;
pub mod memory;
pub mod nodes;
pub mod pipeline;
pub mod prompts;
pub mod review;
pub mod route;
pub mod schedule;
pub mod state;
pub mod verify;

pub use dedup::LinkCache;
pub use error::PipelineError;
pub use graph::{CompilationError, RunOutcome, Suspension};
pub use pipeline::{
    build_graph, Collaborators, Pipeline, PipelineCheckpointer, PipelineGraph, PipelineOutcome,
    PipelineSettings,
};
pub use review::{parse_response, parse_response_text, HumanResponse, ReviewPayload};
pub use schedule::{PrioritySlot, Schedule};
pub use state::{PipelineConfig, PostState, Stage, Status};
