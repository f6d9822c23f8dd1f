//! SQLite-backed store (SqliteStore). Persistent across process restarts.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use rusqlite::params;

use super::store::{Namespace, Store, StoreError};

fn ns_to_key(ns: &Namespace) -> String {
    serde_json::to_string(ns).unwrap_or_else(|_| "[]".to_string())
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

fn storage(e: impl std::fmt::Display) -> StoreError {
    StoreError::Storage(e.to_string())
}

/// SQLite store. Table `store_kv(ns, key, value, created_at, updated_at)`; the namespace
/// is stored as a JSON array string.
pub struct SqliteStore {
    db_path: PathBuf,
}

impl SqliteStore {
    /// Opens (or creates) the database and ensures the table exists.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db_path = path.as_ref().to_path_buf();
        let conn = rusqlite::Connection::open(&db_path).map_err(storage)?;
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS store_kv (
                ns TEXT NOT NULL,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                created_at INTEGER NOT NULL DEFAULT 0,
                updated_at INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (ns, key)
            )
            "#,
            [],
        )
        .map_err(storage)?;
        Ok(Self { db_path })
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn put(
        &self,
        namespace: &Namespace,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<(), StoreError> {
        let ns = ns_to_key(namespace);
        let key = key.to_string();
        let value_str = serde_json::to_string(value)?;
        let db_path = self.db_path.clone();
        let now = now_millis();

        tokio::task::spawn_blocking(move || {
            let conn = rusqlite::Connection::open(&db_path).map_err(storage)?;
            conn.execute(
                r#"
                INSERT INTO store_kv (ns, key, value, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?4)
                ON CONFLICT (ns, key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
                "#,
                params![ns, key, value_str, now],
            )
            .map_err(storage)?;
            Ok::<(), StoreError>(())
        })
        .await
        .map_err(storage)?
    }

    async fn get(
        &self,
        namespace: &Namespace,
        key: &str,
    ) -> Result<Option<serde_json::Value>, StoreError> {
        let ns = ns_to_key(namespace);
        let key = key.to_string();
        let db_path = self.db_path.clone();

        let value_str = tokio::task::spawn_blocking(move || {
            let conn = rusqlite::Connection::open(&db_path).map_err(storage)?;
            let mut stmt = conn
                .prepare("SELECT value FROM store_kv WHERE ns = ?1 AND key = ?2")
                .map_err(storage)?;
            let mut rows = stmt.query(params![ns, key]).map_err(storage)?;
            let value = match rows.next().map_err(storage)? {
                Some(row) => Some(row.get::<_, String>(0).map_err(storage)?),
                None => None,
            };
            Ok::<_, StoreError>(value)
        })
        .await
        .map_err(storage)??;

        match value_str {
            Some(s) => Ok(Some(serde_json::from_str(&s)?)),
            None => Ok(None),
        }
    }

    async fn delete(&self, namespace: &Namespace, key: &str) -> Result<(), StoreError> {
        let ns = ns_to_key(namespace);
        let key = key.to_string();
        let db_path = self.db_path.clone();

        tokio::task::spawn_blocking(move || {
            let conn = rusqlite::Connection::open(&db_path).map_err(storage)?;
            conn.execute(
                "DELETE FROM store_kv WHERE ns = ?1 AND key = ?2",
                params![ns, key],
            )
            .map_err(storage)?;
            Ok::<(), StoreError>(())
        })
        .await
        .map_err(storage)?
    }

    async fn list(&self, namespace: &Namespace) -> Result<Vec<String>, StoreError> {
        let ns = ns_to_key(namespace);
        let db_path = self.db_path.clone();

        tokio::task::spawn_blocking(move || {
            let conn = rusqlite::Connection::open(&db_path).map_err(storage)?;
            let mut stmt = conn
                .prepare("SELECT key FROM store_kv WHERE ns = ?1 ORDER BY key ASC")
                .map_err(storage)?;
            let rows = stmt
                .query_map(params![ns], |row| row.get::<_, String>(0))
                .map_err(storage)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(storage)
        })
        .await
        .map_err(storage)?
    }
}
