use serde::Serialize;

use crate::errors::{LineageError, Result};
use crate::snapshot::RelationSnapshot;

use super::invariants;

/// Every integrity finding for one family tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    pub tree: String,
    /// (child, parent) pairs not exactly one level apart
    pub level_violations: Vec<(String, String)>,
    /// Members with more than two member parents
    pub parent_overflows: Vec<(String, Vec<String>)>,
    /// Members with more than one spousal partner in the tree
    pub spousal_conflicts: Vec<(String, Vec<String>)>,
    /// Married partners placed on different levels
    pub spouse_level_mismatches: Vec<(String, String)>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.level_violations.is_empty()
            && self.parent_overflows.is_empty()
            && self.spousal_conflicts.is_empty()
            && self.spouse_level_mismatches.is_empty()
    }
}

/// Run every finder over the snapshot
pub fn inspect(snapshot: &RelationSnapshot) -> IntegrityReport {
    IntegrityReport {
        tree: snapshot.tree().to_string(),
        level_violations: invariants::find_level_violations(snapshot),
        parent_overflows: invariants::find_parent_overflows(snapshot),
        spousal_conflicts: invariants::find_spousal_conflicts(snapshot),
        spouse_level_mismatches: invariants::find_spouse_level_mismatches(snapshot),
    }
}

/// Validate a family tree snapshot
///
/// Checks generational consistency and the parent cap. Spousal findings are
/// only reported by [`inspect`].
///
/// # Errors
/// Returns the first violation as `LineageError::InconsistentState`. For
/// exhaustive reporting, use [`inspect`].
pub fn validate_snapshot(snapshot: &RelationSnapshot) -> Result<()> {
    if let Some((child, parent)) = invariants::find_level_violations(snapshot).first() {
        return Err(LineageError::InconsistentState {
            reason: format!(
                "{} is at level {} but its parent {} is at level {}",
                child,
                snapshot.level_of(child),
                parent,
                snapshot.level_of(parent)
            ),
        });
    }

    if let Some((child, parents)) = invariants::find_parent_overflows(snapshot).first() {
        return Err(LineageError::InconsistentState {
            reason: format!("{} has {} parents: {}", child, parents.len(), parents.join(", ")),
        });
    }

    Ok(())
}
