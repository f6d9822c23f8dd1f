//! In-memory checkpointer (MemorySaver). Not persistent; for dev and tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::graph::StageId;

use super::checkpoint::{Checkpoint, CheckpointListItem};
use super::checkpointer::{CheckpointError, Checkpointer};

/// In-memory checkpointer. Each run keeps its checkpoints in insertion order, newest last.
pub struct MemorySaver<S, K> {
    by_run: Arc<RwLock<HashMap<String, Vec<Checkpoint<S, K>>>>>,
}

impl<S, K> MemorySaver<S, K> {
    pub fn new() -> Self {
        Self {
            by_run: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<S, K> Default for MemorySaver<S, K> {
    fn default() -> Self {
        Self::new()
    }
}

fn list_item<S, K: StageId>(cp: &Checkpoint<S, K>) -> CheckpointListItem {
    CheckpointListItem {
        checkpoint_id: cp.id.clone(),
        ts: cp.ts.clone(),
        paused_stage: cp.paused_stage.map(|k| k.to_string()),
        metadata: cp.metadata.clone(),
    }
}

#[async_trait]
impl<S, K> Checkpointer<S, K> for MemorySaver<S, K>
where
    S: Clone + Send + Sync + 'static,
    K: StageId,
{
    async fn put(&self, checkpoint: &Checkpoint<S, K>) -> Result<String, CheckpointError> {
        let mut guard = self.by_run.write().await;
        guard
            .entry(checkpoint.run_id.clone())
            .or_default()
            .push(checkpoint.clone());
        Ok(checkpoint.id.clone())
    }

    async fn get_latest(&self, run_id: &str) -> Result<Option<Checkpoint<S, K>>, CheckpointError> {
        let guard = self.by_run.read().await;
        Ok(guard.get(run_id).and_then(|list| list.last().cloned()))
    }

    async fn get(
        &self,
        run_id: &str,
        checkpoint_id: &str,
    ) -> Result<Option<Checkpoint<S, K>>, CheckpointError> {
        let guard = self.by_run.read().await;
        Ok(guard
            .get(run_id)
            .and_then(|list| list.iter().find(|cp| cp.id == checkpoint_id).cloned()))
    }

    async fn list(
        &self,
        run_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<CheckpointListItem>, CheckpointError> {
        let guard = self.by_run.read().await;
        let mut items: Vec<CheckpointListItem> = guard
            .get(run_id)
            .map(|list| list.iter().map(list_item).collect())
            .unwrap_or_default();
        if let Some(n) = limit {
            if items.len() > n {
                items = items.split_off(items.len() - n);
            }
        }
        Ok(items)
    }
}
