//! Reducers: per-field merge strategies, and the state updater that applies them.
//!
//! A reducer decides how a partial update is folded into the current value of a field:
//!
//! - [`LastValue`]: overwrite
//! - [`Topic`]: append without dedup (order and multiplicity preserved)
//! - [`FilteredSet`]: set union, dropping values rejected by a filter
//!
//! The same reducers fold updates into state (after each stage) and updates into updates
//! (when a fan-out stage combines the outputs of concurrent tasks), so sequential and
//! concurrent merges follow one rule.

mod filtered_set;
mod last_value;
mod topic;
mod updater;

pub use filtered_set::{FilteredSet, UrlFilter};
pub use last_value::LastValue;
pub use topic::Topic;
pub use updater::{BoxedStateUpdater, FieldBasedUpdater, StateUpdater};

use std::fmt::{self, Debug};

use serde::Serialize;

/// Merge policy of a state field, as data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// The update replaces the current value.
    Overwrite,
    /// The update is appended; duplicates are kept.
    Append,
    /// The update is unioned in after filtering.
    UnionFiltered,
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MergePolicy::Overwrite => "overwrite",
            MergePolicy::Append => "append",
            MergePolicy::UnionFiltered => "union_filtered",
        })
    }
}

/// Reducer for values of type `T`.
pub trait Channel<T>: Send + Sync + Debug {
    /// Folds `update` into `current`.
    fn merge(&self, current: &mut T, update: T);

    /// The policy this reducer implements.
    fn policy(&self) -> MergePolicy;
}
