//! Cross-run cache of links that were already turned into a post.
//!
//! One record in the long-term [`Store`]: namespace `["used-links"]`, key `"urls"`,
//! value `{"data": [..]}`. The record only grows, except through [`LinkCache::clear`].
//! An unreachable store never fails the pipeline: reads degrade to an empty set.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::memory::{Namespace, Store, StoreError};

pub const CACHE_NAMESPACE: &str = "used-links";
pub const CACHE_KEY: &str = "urls";

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheRecord {
    data: Vec<String>,
}

/// Set of previously used links.
///
/// `put` is read-merge-write. A single instance serialises its own writers; separate
/// processes sharing one store can still lose each other's writes.
pub struct LinkCache {
    store: Option<Arc<dyn Store>>,
    write_lock: Mutex<()>,
}

impl LinkCache {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store: Some(store),
            write_lock: Mutex::new(()),
        }
    }

    /// Cache without storage: everything is new and writes are dropped.
    pub fn disabled() -> Self {
        Self {
            store: None,
            write_lock: Mutex::new(()),
        }
    }

    fn namespace() -> Namespace {
        vec![CACHE_NAMESPACE.to_string()]
    }

    async fn read(&self, store: &dyn Store) -> Result<BTreeSet<String>, StoreError> {
        match store.get(&Self::namespace(), CACHE_KEY).await? {
            Some(value) => {
                let record: CacheRecord = serde_json::from_value(value)?;
                Ok(record.data.into_iter().collect())
            }
            None => Ok(BTreeSet::new()),
        }
    }

    /// Stored links; empty when the record is absent or the store is unavailable.
    pub async fn get(&self) -> BTreeSet<String> {
        let Some(store) = &self.store else {
            return BTreeSet::new();
        };
        match self.read(store.as_ref()).await {
            Ok(set) => set,
            Err(e) => {
                warn!(error = %e, "link cache unavailable, treating all links as new");
                BTreeSet::new()
            }
        }
    }

    /// Adds `links` to the stored set.
    pub async fn put(&self, links: &[String]) -> Result<(), StoreError> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        let _guard = self.write_lock.lock().await;
        let mut set = self.read(store.as_ref()).await?;
        let before = set.len();
        set.extend(links.iter().cloned());
        let record = CacheRecord {
            data: set.into_iter().collect(),
        };
        let added = record.data.len() - before;
        store
            .put(&Self::namespace(), CACHE_KEY, &serde_json::to_value(&record)?)
            .await?;
        debug!(added, total = record.data.len(), "link cache updated");
        Ok(())
    }

    /// Removes the record entirely.
    pub async fn clear(&self) -> Result<(), StoreError> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        let _guard = self.write_lock.lock().await;
        store.delete(&Self::namespace(), CACHE_KEY).await
    }

    /// Splits `candidates` into `(new, duplicate)` without touching the cache. Order
    /// within each side follows `candidates`.
    pub async fn check_usage(&self, candidates: &[String]) -> (Vec<String>, Vec<String>) {
        let used = self.get().await;
        candidates
            .iter()
            .cloned()
            .partition(|link| !used.contains(link))
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::memory::InMemoryStore;

    struct BrokenStore;

    #[async_trait]
    impl Store for BrokenStore {
        async fn put(&self, _: &Namespace, _: &str, _: &serde_json::Value) -> Result<(), StoreError> {
            Err(StoreError::Storage("down".into()))
        }
        async fn get(&self, _: &Namespace, _: &str) -> Result<Option<serde_json::Value>, StoreError> {
            Err(StoreError::Storage("down".into()))
        }
        async fn delete(&self, _: &Namespace, _: &str) -> Result<(), StoreError> {
            Err(StoreError::Storage("down".into()))
        }
        async fn list(&self, _: &Namespace) -> Result<Vec<String>, StoreError> {
            Err(StoreError::Storage("down".into()))
        }
    }

    fn links(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    /// **Scenario**: put(A); put(B) stores a superset of A ∪ B in the documented record shape.
    #[tokio::test]
    async fn put_is_union() {
        let store = Arc::new(InMemoryStore::new());
        let cache = LinkCache::new(store.clone());
        cache.put(&links(&["https://a.com", "https://b.com"])).await.unwrap();
        cache.put(&links(&["https://c.com", "https://a.com"])).await.unwrap();
        let got = cache.get().await;
        assert_eq!(got.len(), 3);
        let raw = store
            .get(&vec!["used-links".to_string()], "urls")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            raw,
            serde_json::json!({"data": ["https://a.com", "https://b.com", "https://c.com"]})
        );
    }

    /// **Scenario**: cached link is partitioned as duplicate, the other as new.
    #[tokio::test]
    async fn check_usage_partitions() {
        let cache = LinkCache::new(Arc::new(InMemoryStore::new()));
        cache.put(&links(&["https://used.com"])).await.unwrap();
        let (new, dup) = cache
            .check_usage(&links(&["https://used.com", "https://new.com"]))
            .await;
        assert_eq!(new, links(&["https://new.com"]));
        assert_eq!(dup, links(&["https://used.com"]));
        assert_eq!(cache.get().await.len(), 1);
    }

    #[tokio::test]
    async fn clear_removes_record() {
        let cache = LinkCache::new(Arc::new(InMemoryStore::new()));
        cache.put(&links(&["https://a.com"])).await.unwrap();
        cache.clear().await.unwrap();
        assert!(cache.get().await.is_empty());
    }

    /// **Scenario**: unavailable store degrades reads to "everything is new".
    #[tokio::test]
    async fn broken_store_treats_all_as_new() {
        let cache = LinkCache::new(Arc::new(BrokenStore));
        let (new, dup) = cache.check_usage(&links(&["https://a.com"])).await;
        assert_eq!(new.len(), 1);
        assert!(dup.is_empty());
        assert!(cache.put(&links(&["https://a.com"])).await.is_err());
    }

    #[tokio::test]
    async fn disabled_cache_is_noop() {
        let cache = LinkCache::disabled();
        cache.put(&links(&["https://a.com"])).await.unwrap();
        assert!(cache.get().await.is_empty());
    }
}
