//! Append reducer.

use super::{Channel, MergePolicy};

/// Accumulates values into a list. No dedup: order and multiplicity of the updates
/// are preserved.
#[derive(Debug, Clone, Copy, Default)]
pub struct Topic;

impl<T> Channel<Vec<T>> for Topic {
    fn merge(&self, current: &mut Vec<T>, update: Vec<T>) {
        current.extend(update);
    }

    fn policy(&self) -> MergePolicy {
        MergePolicy::Append
    }
}
