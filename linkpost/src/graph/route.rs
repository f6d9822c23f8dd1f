//! Routing decision returned by routers and fixed edges.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where execution goes after a stage: another stage, or the terminal route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "route", content = "stage")]
pub enum Route<K> {
    /// Run this stage next.
    Stage(K),
    /// End the run; no further stages and no side effects.
    End,
}

impl<K> Route<K> {
    /// Returns `true` for the terminal route.
    pub fn is_end(&self) -> bool {
        matches!(self, Route::End)
    }

    /// The target stage, if any.
    pub fn stage(&self) -> Option<&K> {
        match self {
            Route::Stage(k) => Some(k),
            Route::End => None,
        }
    }
}

impl<K> From<K> for Route<K> {
    fn from(stage: K) -> Self {
        Route::Stage(stage)
    }
}

impl<K: fmt::Display> fmt::Display for Route<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Stage(k) => write!(f, "{}", k),
            Route::End => f.write_str("__end__"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_end_uses_sentinel() {
        assert_eq!(Route::<u8>::End.to_string(), "__end__");
        assert_eq!(Route::Stage(7u8).to_string(), "7");
    }

    #[test]
    fn stage_accessor() {
        assert_eq!(Route::Stage(3u8).stage(), Some(&3));
        assert!(Route::<u8>::End.stage().is_none());
        assert!(Route::<u8>::End.is_end());
    }

    #[test]
    fn serde_shape_is_tagged() {
        let v = serde_json::to_value(Route::Stage(1u8)).unwrap();
        assert_eq!(v, serde_json::json!({"route": "stage", "stage": 1}));
        let end: Route<u8> = serde_json::from_value(serde_json::json!({"route": "end"})).unwrap();
        assert_eq!(end, Route::End);
    }
}
