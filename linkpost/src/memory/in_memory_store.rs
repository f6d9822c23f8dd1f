//! In-memory store. Not persistent; for dev and tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::store::{Namespace, Store, StoreError};

/// In-memory store keyed by `(namespace, key)`.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<HashMap<(Namespace, String), serde_json::Value>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn put(
        &self,
        namespace: &Namespace,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<(), StoreError> {
        let mut guard = self.inner.write().await;
        guard.insert((namespace.clone(), key.to_string()), value.clone());
        Ok(())
    }

    async fn get(
        &self,
        namespace: &Namespace,
        key: &str,
    ) -> Result<Option<serde_json::Value>, StoreError> {
        let guard = self.inner.read().await;
        Ok(guard.get(&(namespace.clone(), key.to_string())).cloned())
    }

    async fn delete(&self, namespace: &Namespace, key: &str) -> Result<(), StoreError> {
        let mut guard = self.inner.write().await;
        guard.remove(&(namespace.clone(), key.to_string()));
        Ok(())
    }

    async fn list(&self, namespace: &Namespace) -> Result<Vec<String>, StoreError> {
        let guard = self.inner.read().await;
        let mut keys: Vec<String> = guard
            .keys()
            .filter(|(ns, _)| ns == namespace)
            .map(|(_, k)| k.clone())
            .collect();
        keys.sort();
        Ok(keys)
    }
}
