//! Typed outcomes for mutating aggregate operations
//!
//! The engine distinguishes three non-exceptional results: the write applied,
//! the target aggregate did not exist, or the commit touched zero rows.
//! Callers match on the variant; `Display` renders the literal messages the
//! HTTP layer returns to clients.

use serde::Serialize;
use std::fmt;

/// Outcome of a create/update/delete on an aggregate.
///
/// Infrastructure failures are not outcomes; they surface as errors and abort
/// the in-flight operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WriteOutcome {
    /// The operation committed and changed at least one row
    Applied,
    /// The target aggregate does not exist
    NotFound { entity: &'static str, id: i32 },
    /// The commit affected zero rows though no error occurred
    NoChanges { entity: &'static str, id: i32 },
}

impl WriteOutcome {
    pub fn not_found(entity: &'static str, id: impl Into<i32>) -> Self {
        WriteOutcome::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn no_changes(entity: &'static str, id: impl Into<i32>) -> Self {
        WriteOutcome::NoChanges {
            entity,
            id: id.into(),
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, WriteOutcome::Applied)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, WriteOutcome::NotFound { .. })
    }
}

impl fmt::Display for WriteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteOutcome::Applied => write!(f, "OK"),
            WriteOutcome::NotFound { entity, id } => {
                write!(f, "The {} with id {} was not found", entity, id)
            }
            WriteOutcome::NoChanges { entity, id } => {
                write!(f, "No changes for the {} with id {}", entity, id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applied_renders_ok() {
        assert_eq!(WriteOutcome::Applied.to_string(), "OK");
        assert!(WriteOutcome::Applied.is_applied());
    }

    #[test]
    fn not_found_carries_entity_and_id() {
        let outcome = WriteOutcome::not_found("provider", 12);
        assert!(outcome.is_not_found());
        assert_eq!(outcome.to_string(), "The provider with id 12 was not found");
    }

    #[test]
    fn no_changes_is_distinct_from_ok_and_not_found() {
        let outcome = WriteOutcome::no_changes("service", 3);
        assert!(!outcome.is_applied());
        assert!(!outcome.is_not_found());
        assert_eq!(outcome.to_string(), "No changes for the service with id 3");
    }
}
