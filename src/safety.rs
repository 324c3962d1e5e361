//! The construction-time switch shared by every collection.

use serde::{Deserialize, Serialize};

/// Selects whether a collection synchronizes access across threads.
///
/// The mode is fixed when a collection is built and is carried unchanged into
/// every collection derived from it (clones, sub-collections, set algebra
/// results).
///
/// ```
/// use dualmode::Safety;
///
/// assert_eq!(Safety::default(), Safety::Unsync);
/// assert_eq!(Safety::from(true), Safety::Concurrent);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Safety {
    /// No synchronization. Acquiring the guard only updates a borrow counter.
    #[default]
    Unsync,
    /// Reader-writer locking around every public operation.
    Concurrent,
}

impl Safety {
    /// Returns `true` for [`Safety::Concurrent`].
    #[inline]
    pub const fn is_concurrent(self) -> bool {
        matches!(self, Safety::Concurrent)
    }
}

impl From<bool> for Safety {
    #[inline]
    fn from(concurrent: bool) -> Self {
        if concurrent {
            Safety::Concurrent
        } else {
            Safety::Unsync
        }
    }
}

impl From<Safety> for bool {
    #[inline]
    fn from(safety: Safety) -> Self {
        safety.is_concurrent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_conversion_round_trips() {
        assert_eq!(Safety::from(false), Safety::Unsync);
        assert!(bool::from(Safety::Concurrent));
        assert!(!Safety::Unsync.is_concurrent());
    }

    #[test]
    fn deserializes_from_lowercase_name() {
        #[derive(Deserialize)]
        struct Config {
            safety: Safety,
        }

        let config: Config = serde_json::from_str(r#"{"safety":"concurrent"}"#).unwrap();
        assert_eq!(config.safety, Safety::Concurrent);
        assert_eq!(serde_json::to_string(&Safety::Unsync).unwrap(), r#""unsync""#);
    }
}
