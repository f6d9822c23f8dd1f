//! Set-union reducer with a filter on incoming values.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use super::{Channel, MergePolicy};

/// Predicate deciding which strings may enter a filtered set.
#[derive(Clone)]
pub struct UrlFilter {
    accept: Arc<dyn Fn(&str) -> bool + Send + Sync>,
}

impl UrlFilter {
    pub fn new(accept: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        Self {
            accept: Arc::new(accept),
        }
    }

    pub fn allow_all() -> Self {
        Self::new(|_| true)
    }

    pub fn accepts(&self, value: &str) -> bool {
        (self.accept)(value)
    }
}

impl fmt::Debug for UrlFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UrlFilter(<function>)")
    }
}

/// Unions updates into a sorted set, dropping values the filter rejects.
///
/// The result does not depend on the order in which updates arrive.
#[derive(Debug, Clone)]
pub struct FilteredSet {
    filter: UrlFilter,
}

impl FilteredSet {
    pub fn new(filter: UrlFilter) -> Self {
        Self { filter }
    }
}

impl Channel<BTreeSet<String>> for FilteredSet {
    fn merge(&self, current: &mut BTreeSet<String>, update: BTreeSet<String>) {
        current.extend(update.into_iter().filter(|v| self.filter.accepts(v)));
    }

    fn policy(&self) -> MergePolicy {
        MergePolicy::UnionFiltered
    }
}
