//! Long-term store: JSON values keyed by `(namespace, key)`, shared across runs.

use async_trait::async_trait;
use thiserror::Error;

/// Namespace path, e.g. `["used-links"]`.
pub type Namespace = Vec<String>;

/// Error from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("serialization: {0}")]
    Serialization(String),
    #[error("storage: {0}")]
    Storage(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// Namespaced key/value store.
///
/// **Interaction**: Used as `Arc<dyn Store>` by [`LinkCache`](crate::dedup::LinkCache).
#[async_trait]
pub trait Store: Send + Sync {
    /// Inserts or replaces the value at `(namespace, key)`.
    async fn put(
        &self,
        namespace: &Namespace,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<(), StoreError>;

    async fn get(
        &self,
        namespace: &Namespace,
        key: &str,
    ) -> Result<Option<serde_json::Value>, StoreError>;

    /// Removes the value; deleting a missing key is not an error.
    async fn delete(&self, namespace: &Namespace, key: &str) -> Result<(), StoreError>;

    /// Keys in `namespace`, sorted.
    async fn list(&self, namespace: &Namespace) -> Result<Vec<String>, StoreError>;
}
