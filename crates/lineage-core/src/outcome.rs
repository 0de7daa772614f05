//! Edit outcomes
//!
//! A mutating operation either applies, is rejected because the edit is not
//! applicable to the current tree, or fails with a `LineageError`. Rejection
//! is an expected answer and never leaves writes behind.

use serde::Serialize;

use crate::model::{Level, RelationKind};

/// Why an edit was not applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
    /// The character is already attached to the tree
    AlreadyMember { character: String },

    /// The child would end up with more than two parents in the tree
    TooManyParents { child: String },

    /// A party already has a spousal partner present in the tree
    SpouseAlreadyPresent { character: String, partner: String },

    /// An edge already links the two characters
    DuplicateRelation { existing: RelationKind },

    /// Both names designate the same character
    SelfRelation { character: String },

    /// Neither party is placed, so no level can be derived
    NoAnchor,

    /// A new parent can only be placed above a level 0 child
    NonRootChild { child: String, child_level: Level },

    /// Both parties are placed at levels that contradict the edge
    InconsistentLevels {
        parent_level: Level,
        child_level: Level,
    },

    /// The placed child has no placed parent to vouch for the new one
    NoCoParent { child: String },

    /// The child's existing parent has no relation with the new parent
    UnrelatedCoParent { co_parent: String },

    /// Spouses must share a generation
    LevelMismatch { left: Level, right: Level },

    /// Relabelling would change generational meaning
    IncompatibleRelabel { from: RelationKind, to: RelationKind },

    /// The cascade would misalign an existing parent/child pair
    CascadeConflict { child: String, parent: String },
}

impl RejectReason {
    /// Stable code for callers mapping rejections to client errors
    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::AlreadyMember { .. } => "REJ_ALREADY_MEMBER",
            RejectReason::TooManyParents { .. } => "REJ_TOO_MANY_PARENTS",
            RejectReason::SpouseAlreadyPresent { .. } => "REJ_SPOUSE_ALREADY_PRESENT",
            RejectReason::DuplicateRelation { .. } => "REJ_DUPLICATE_RELATION",
            RejectReason::SelfRelation { .. } => "REJ_SELF_RELATION",
            RejectReason::NoAnchor => "REJ_NO_ANCHOR",
            RejectReason::NonRootChild { .. } => "REJ_NON_ROOT_CHILD",
            RejectReason::InconsistentLevels { .. } => "REJ_INCONSISTENT_LEVELS",
            RejectReason::NoCoParent { .. } => "REJ_NO_CO_PARENT",
            RejectReason::UnrelatedCoParent { .. } => "REJ_UNRELATED_CO_PARENT",
            RejectReason::LevelMismatch { .. } => "REJ_LEVEL_MISMATCH",
            RejectReason::IncompatibleRelabel { .. } => "REJ_INCOMPATIBLE_RELABEL",
            RejectReason::CascadeConflict { .. } => "REJ_CASCADE_CONFLICT",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::AlreadyMember { character } => {
                write!(f, "{} is already a member of the tree", character)
            }
            RejectReason::TooManyParents { child } => {
                write!(f, "{} already has two parents in the tree", child)
            }
            RejectReason::SpouseAlreadyPresent { character, partner } => write!(
                f,
                "{} already has a spousal relation with {} in the tree",
                character, partner
            ),
            RejectReason::DuplicateRelation { existing } => {
                write!(f, "a '{}' relation already links them", existing)
            }
            RejectReason::SelfRelation { character } => {
                write!(f, "{} cannot be related to itself", character)
            }
            RejectReason::NoAnchor => write!(f, "neither character is placed in the tree"),
            RejectReason::NonRootChild { child, child_level } => write!(
                f,
                "{} is at level {}; a new parent can only be added above level 0",
                child, child_level
            ),
            RejectReason::InconsistentLevels {
                parent_level,
                child_level,
            } => write!(
                f,
                "parent at level {} cannot have a child at level {}",
                parent_level, child_level
            ),
            RejectReason::NoCoParent { child } => {
                write!(f, "{} is placed but has no parent in the tree", child)
            }
            RejectReason::UnrelatedCoParent { co_parent } => {
                write!(f, "the new parent has no relation with {}", co_parent)
            }
            RejectReason::LevelMismatch { left, right } => {
                write!(f, "spouses must share a level ({} vs {})", left, right)
            }
            RejectReason::IncompatibleRelabel { from, to } => {
                write!(f, "cannot relabel '{}' as '{}'", from, to)
            }
            RejectReason::CascadeConflict { child, parent } => write!(
                f,
                "placing the edge would leave {} out of line with its parent {}",
                child, parent
            ),
        }
    }
}

/// Result of a mutating engine operation that did not fail
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum EditOutcome {
    Applied,
    Rejected(RejectReason),
}

impl EditOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, EditOutcome::Applied)
    }

    pub fn rejection(&self) -> Option<&RejectReason> {
        match self {
            EditOutcome::Applied => None,
            EditOutcome::Rejected(reason) => Some(reason),
        }
    }

    /// Short label used in log events
    pub fn label(&self) -> &'static str {
        match self {
            EditOutcome::Applied => "applied",
            EditOutcome::Rejected(_) => "rejected",
        }
    }
}

impl From<RejectReason> for EditOutcome {
    fn from(reason: RejectReason) -> Self {
        EditOutcome::Rejected(reason)
    }
}
