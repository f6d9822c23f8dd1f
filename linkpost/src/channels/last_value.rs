//! Overwrite reducer.

use super::{Channel, MergePolicy};

/// Keeps only the last written value.
#[derive(Debug, Clone, Copy, Default)]
pub struct LastValue;

impl LastValue {
    /// Overwrites `current` only when the update is present.
    pub fn merge_present<T>(&self, current: &mut T, update: Option<T>) {
        if let Some(v) = update {
            *current = v;
        }
    }
}

impl<T> Channel<T> for LastValue {
    fn merge(&self, current: &mut T, update: T) {
        *current = update;
    }

    fn policy(&self) -> MergePolicy {
        MergePolicy::Overwrite
    }
}
