//! Command handlers behind the `linkpost` binary.
//!
//! Each handler returns JSON so `main` only prints. Runs, checkpoints and the dedup
//! cache share one SQLite file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use linkpost::graph::{generate_dot, generate_text, CompilationError};
use linkpost::memory::{CheckpointError, JsonSerializer, SqliteSaver, SqliteStore, StoreError};
use linkpost::{
    parse_response_text, Collaborators, LinkCache, Pipeline, PipelineConfig, PipelineError,
    PipelineOutcome, PipelineSettings, PostState, RunOutcome, Stage,
};
use serde_json::{json, Value};
use thiserror::Error;

pub const APP_NAME: &str = "linkpost";

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error(transparent)]
    Compile(#[from] CompilationError),
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Usage(String),
}

/// `LINKPOST_DB`, else `<data dir>/linkpost/linkpost.db`, else `./linkpost.db`.
pub fn default_db_path() -> PathBuf {
    match std::env::var_os("LINKPOST_DB").filter(|p| !p.is_empty()) {
        Some(p) => PathBuf::from(p),
        None => config::data_dir(APP_NAME)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("linkpost.db"),
    }
}

/// Pipeline persisted in the SQLite file at `db_path`.
pub fn open_pipeline(
    db_path: &Path,
    collab: Collaborators,
    settings: PipelineSettings,
) -> Result<Pipeline, CliError> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let store = SqliteStore::new(db_path)?;
    let saver = SqliteSaver::<PostState, Stage>::new(db_path, Arc::new(JsonSerializer::new()))?;
    let cache = Arc::new(LinkCache::new(Arc::new(store)));
    Ok(Pipeline::new(collab, cache, Some(Arc::new(saver)), settings)?)
}

/// JSON summary of a run outcome.
pub fn outcome_json(outcome: &PipelineOutcome) -> Value {
    match outcome {
        RunOutcome::Suspended(s) => json!({
            "status": "suspended",
            "runId": s.run_id(),
            "checkpointId": s.checkpoint_id(),
            "stage": s.stage(),
            "payload": s.payload,
        }),
        RunOutcome::Completed(state) => json!({
            "status": "completed",
            "runStatus": state.status,
            "post": state.post,
            "schedule": state.schedule,
            "duplicateLinks": state.duplicate_links,
            "publishResults": state.publish_results,
        }),
    }
}

pub async fn run(
    pipeline: &Pipeline,
    links: Vec<String>,
    config: PipelineConfig,
    run_id: Option<String>,
) -> Result<Value, CliError> {
    if links.is_empty() {
        return Err(CliError::Usage("at least one link is required".into()));
    }
    let outcome = pipeline.start(links, config, run_id).await?;
    Ok(outcome_json(&outcome))
}

/// `response` is JSON text or a plain string.
pub async fn resume(pipeline: &Pipeline, run_id: &str, response: &str) -> Result<Value, CliError> {
    let outcome = pipeline
        .resume_with(run_id, parse_response_text(response))
        .await?;
    Ok(outcome_json(&outcome))
}

pub async fn status(pipeline: &Pipeline, run_id: &str) -> Result<Value, CliError> {
    let checkpoint = pipeline
        .state(run_id)
        .await?
        .ok_or_else(|| PipelineError::RunNotFound(run_id.to_string()))?;
    let history = pipeline.history(run_id, None).await?;
    Ok(json!({
        "runId": checkpoint.run_id,
        "checkpointId": checkpoint.id,
        "ts": checkpoint.ts,
        "step": checkpoint.metadata.step,
        "source": checkpoint.metadata.source.as_str(),
        "suspended": checkpoint.is_suspended(),
        "pausedStage": checkpoint.paused_stage,
        "status": checkpoint.state.status,
        "post": checkpoint.state.post,
        "schedule": checkpoint.state.schedule.describe(),
        "checkpoints": history.len(),
    }))
}

pub async fn cache_show(pipeline: &Pipeline) -> Value {
    let links: Vec<String> = pipeline.cache().get().await.into_iter().collect();
    json!({ "data": links })
}

pub async fn cache_clear(pipeline: &Pipeline) -> Result<Value, CliError> {
    pipeline.cache().clear().await?;
    Ok(json!({ "cleared": true }))
}

pub fn graph(pipeline: &Pipeline, dot: bool) -> String {
    if dot {
        generate_dot(pipeline.graph())
    } else {
        generate_text(pipeline.graph())
    }
}
