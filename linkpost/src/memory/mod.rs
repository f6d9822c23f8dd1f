//! Persistence: run checkpoints (short-term) and a namespaced key/value store (long-term).
//!
//! - [`Checkpointer`] / [`Checkpoint`]: per-run snapshots used to suspend and resume.
//!   [`MemorySaver`] for tests and dev, [`SqliteSaver`] for persistence across processes.
//! - [`Store`]: cross-run values keyed by `(namespace, key)`. [`InMemoryStore`] and
//!   [`SqliteStore`]. The dedup cache lives here.

mod checkpoint;
mod checkpointer;
mod in_memory_store;
mod memory_saver;
mod serializer;
mod sqlite_saver;
mod sqlite_store;
mod store;

pub use checkpoint::{
    Checkpoint, CheckpointListItem, CheckpointMetadata, CheckpointSource, CHECKPOINT_VERSION,
};
pub use checkpointer::{CheckpointError, Checkpointer};
pub use in_memory_store::InMemoryStore;
pub use memory_saver::MemorySaver;
pub use serializer::{JsonSerializer, Serializer};
pub use sqlite_saver::SqliteSaver;
pub use sqlite_store::SqliteStore;
pub use store::{Namespace, Store, StoreError};
