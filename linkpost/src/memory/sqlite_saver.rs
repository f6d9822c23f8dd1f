//! SQLite-backed checkpointer (SqliteSaver). Persistent across process restarts.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use rusqlite::params;

use crate::graph::StageId;

use super::checkpoint::{
    Checkpoint, CheckpointListItem, CheckpointMetadata, CheckpointSource, CHECKPOINT_VERSION,
};
use super::checkpointer::{CheckpointError, Checkpointer};
use super::serializer::Serializer;

fn storage(e: impl std::fmt::Display) -> CheckpointError {
    CheckpointError::Storage(e.to_string())
}

fn created_at_to_i64(t: &Option<SystemTime>) -> Option<i64> {
    t.as_ref()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok().map(|d| d.as_millis() as i64))
}

fn i64_to_created_at(v: Option<i64>) -> Option<SystemTime> {
    v.and_then(|ms| UNIX_EPOCH.checked_add(Duration::from_millis(ms as u64)))
}

/// SQLite-backed checkpointer. Key: (run_id, checkpoint_id); ordering by insertion (`seq`).
///
/// The paused stage is stored as JSON text; the state goes through the serializer.
/// Uses `spawn_blocking` for all database work.
pub struct SqliteSaver<S, K> {
    db_path: PathBuf,
    serializer: Arc<dyn Serializer<S>>,
    _stage: PhantomData<fn() -> K>,
}

type Row = (String, String, Option<String>, Vec<u8>, String, i64, Option<i64>);

impl<S, K> SqliteSaver<S, K>
where
    S: Clone + Send + Sync + 'static,
    K: StageId,
{
    /// Opens (or creates) the database and ensures the table exists.
    pub fn new(
        path: impl AsRef<Path>,
        serializer: Arc<dyn Serializer<S>>,
    ) -> Result<Self, CheckpointError> {
        let db_path = path.as_ref().to_path_buf();
        let conn = rusqlite::Connection::open(&db_path).map_err(storage)?;
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS checkpoints (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                run_id TEXT NOT NULL,
                checkpoint_id TEXT NOT NULL,
                ts TEXT NOT NULL,
                paused_stage TEXT,
                payload BLOB NOT NULL,
                metadata_source TEXT NOT NULL,
                metadata_step INTEGER NOT NULL,
                metadata_created_at INTEGER,
                UNIQUE (run_id, checkpoint_id)
            )
            "#,
            [],
        )
        .map_err(storage)?;
        Ok(Self {
            db_path,
            serializer,
            _stage: PhantomData,
        })
    }

    fn decode(&self, run_id: &str, row: Row) -> Result<Checkpoint<S, K>, CheckpointError> {
        let (checkpoint_id, ts, paused_json, payload, source, step, created_at) = row;
        let paused_stage = match paused_json {
            Some(json) => Some(
                serde_json::from_str::<K>(&json)
                    .map_err(|e| CheckpointError::Serialization(e.to_string()))?,
            ),
            None => None,
        };
        Ok(Checkpoint {
            v: CHECKPOINT_VERSION,
            id: checkpoint_id,
            run_id: run_id.to_string(),
            ts,
            paused_stage,
            state: self.serializer.deserialize(&payload)?,
            metadata: CheckpointMetadata {
                source: CheckpointSource::parse(&source),
                step,
                created_at: i64_to_created_at(created_at),
            },
        })
    }

    async fn query_one(
        &self,
        run_id: &str,
        checkpoint_id: Option<&str>,
    ) -> Result<Option<Checkpoint<S, K>>, CheckpointError> {
        let db_path = self.db_path.clone();
        let run = run_id.to_string();
        let want = checkpoint_id.map(String::from);
        let row = tokio::task::spawn_blocking(move || -> Result<Option<Row>, CheckpointError> {
            let conn = rusqlite::Connection::open(&db_path).map_err(storage)?;
            let sql = if want.is_some() {
                "SELECT checkpoint_id, ts, paused_stage, payload, metadata_source, metadata_step, metadata_created_at
                 FROM checkpoints WHERE run_id = ?1 AND checkpoint_id = ?2"
            } else {
                "SELECT checkpoint_id, ts, paused_stage, payload, metadata_source, metadata_step, metadata_created_at
                 FROM checkpoints WHERE run_id = ?1 ORDER BY seq DESC LIMIT 1"
            };
            let mut stmt = conn.prepare(sql).map_err(storage)?;
            let mut rows = match &want {
                Some(id) => stmt.query(params![run, id]),
                None => stmt.query(params![run]),
            }
            .map_err(storage)?;
            let row = match rows.next().map_err(storage)? {
                Some(r) => r,
                None => return Ok(None),
            };
            Ok(Some((
                row.get(0).map_err(storage)?,
                row.get(1).map_err(storage)?,
                row.get(2).map_err(storage)?,
                row.get(3).map_err(storage)?,
                row.get(4).map_err(storage)?,
                row.get(5).map_err(storage)?,
                row.get(6).map_err(storage)?,
            )))
        })
        .await
        .map_err(storage)??;

        match row {
            Some(r) => Ok(Some(self.decode(run_id, r)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl<S, K> Checkpointer<S, K> for SqliteSaver<S, K>
where
    S: Clone + Send + Sync + 'static,
    K: StageId,
{
    async fn put(&self, checkpoint: &Checkpoint<S, K>) -> Result<String, CheckpointError> {
        let payload = self.serializer.serialize(&checkpoint.state)?;
        let paused_stage = match &checkpoint.paused_stage {
            Some(k) => Some(
                serde_json::to_string(k)
                    .map_err(|e| CheckpointError::Serialization(e.to_string()))?,
            ),
            None => None,
        };
        let run_id = checkpoint.run_id.clone();
        let id = checkpoint.id.clone();
        let ts = checkpoint.ts.clone();
        let source = checkpoint.metadata.source.as_str();
        let step = checkpoint.metadata.step;
        let created_at = created_at_to_i64(&checkpoint.metadata.created_at);
        let db_path = self.db_path.clone();

        tokio::task::spawn_blocking(move || {
            let conn = rusqlite::Connection::open(&db_path).map_err(storage)?;
            conn.execute(
                r#"
                INSERT OR REPLACE INTO checkpoints
                (run_id, checkpoint_id, ts, paused_stage, payload,
                 metadata_source, metadata_step, metadata_created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
                params![run_id, id, ts, paused_stage, payload, source, step, created_at],
            )
            .map_err(storage)?;
            Ok::<String, CheckpointError>(id)
        })
        .await
        .map_err(storage)?
    }

    async fn get_latest(&self, run_id: &str) -> Result<Option<Checkpoint<S, K>>, CheckpointError> {
        self.query_one(run_id, None).await
    }

    async fn get(
        &self,
        run_id: &str,
        checkpoint_id: &str,
    ) -> Result<Option<Checkpoint<S, K>>, CheckpointError> {
        self.query_one(run_id, Some(checkpoint_id)).await
    }

    async fn list(
        &self,
        run_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<CheckpointListItem>, CheckpointError> {
        let db_path = self.db_path.clone();
        let run = run_id.to_string();
        type ListRow = (String, String, Option<String>, String, i64, Option<i64>);
        let rows: Vec<ListRow> = tokio::task::spawn_blocking(move || {
            let conn = rusqlite::Connection::open(&db_path).map_err(storage)?;
            let mut stmt = conn
                .prepare(
                    "SELECT checkpoint_id, ts, paused_stage, metadata_source, metadata_step, metadata_created_at
                     FROM checkpoints WHERE run_id = ?1 ORDER BY seq ASC",
                )
                .map_err(storage)?;
            let rows = stmt
                .query_map(params![run], |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                    ))
                })
                .map_err(storage)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(storage)
        })
        .await
        .map_err(storage)??;

        let mut items = Vec::with_capacity(rows.len());
        for (checkpoint_id, ts, paused_json, source, step, created_at) in rows {
            let paused_stage = match paused_json {
                Some(json) => Some(
                    serde_json::from_str::<K>(&json)
                        .map_err(|e| CheckpointError::Serialization(e.to_string()))?
                        .to_string(),
                ),
                None => None,
            };
            items.push(CheckpointListItem {
                checkpoint_id,
                ts,
                paused_stage,
                metadata: CheckpointMetadata {
                    source: CheckpointSource::parse(&source),
                    step,
                    created_at: i64_to_created_at(created_at),
                },
            });
        }
        if let Some(n) = limit {
            if items.len() > n {
                items = items.split_off(items.len() - n);
            }
        }
        Ok(items)
    }
}
