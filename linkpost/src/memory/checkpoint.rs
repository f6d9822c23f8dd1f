//! Checkpoint: a full state snapshot plus the stage at which the run paused.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// Checkpoint format version.
pub const CHECKPOINT_VERSION: u32 = 1;

/// Why a checkpoint was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckpointSource {
    /// A stage paused the run; the checkpoint is resumable.
    Suspend,
    /// The run reached the terminal route.
    Complete,
}

impl CheckpointSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckpointSource::Suspend => "Suspend",
            CheckpointSource::Complete => "Complete",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "Suspend" => CheckpointSource::Suspend,
            _ => CheckpointSource::Complete,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    pub source: CheckpointSource,
    /// Number of stage updates merged into the state so far.
    pub step: i64,
    pub created_at: Option<SystemTime>,
}

/// Snapshot of one run.
///
/// Only the latest checkpoint of a run matters: it is resumable iff `paused_stage` is
/// set. Writing a newer checkpoint for the same run supersedes older ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint<S, K> {
    pub v: u32,
    pub id: String,
    pub run_id: String,
    /// RFC 3339 timestamp.
    pub ts: String,
    pub paused_stage: Option<K>,
    pub state: S,
    pub metadata: CheckpointMetadata,
}

impl<S, K> Checkpoint<S, K> {
    /// New checkpoint with a fresh id and the current time.
    pub fn new(
        run_id: impl Into<String>,
        state: S,
        paused_stage: Option<K>,
        source: CheckpointSource,
        step: i64,
    ) -> Self {
        Self {
            v: CHECKPOINT_VERSION,
            id: uuid::Uuid::new_v4().to_string(),
            run_id: run_id.into(),
            ts: chrono::Utc::now().to_rfc3339(),
            paused_stage,
            state,
            metadata: CheckpointMetadata {
                source,
                step,
                created_at: Some(SystemTime::now()),
            },
        }
    }

    pub fn is_suspended(&self) -> bool {
        self.paused_stage.is_some()
    }
}

/// Checkpoint summary returned by [`Checkpointer::list`](super::Checkpointer::list).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckpointListItem {
    pub checkpoint_id: String,
    pub ts: String,
    /// Paused stage rendered with `Display`; `None` for terminal checkpoints.
    pub paused_stage: Option<String>,
    pub metadata: CheckpointMetadata,
}
