use crate::model::Level;
use crate::outcome::RejectReason;
use crate::snapshot::RelationSnapshot;

use super::plan::LevelPlan;
use super::propagate::{propagate_assign, shift_placed};

/// How a new Parent/Enfant edge fits the existing levels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineageCase {
    /// Child is unplaced; it and its component go below the parent
    PlaceChild { level: Level },
    /// Parent is unplaced above a level 0 child; everyone shifts down
    NewRoot,
    /// Child already sits one level below and the co-parent vouches
    Sibling { co_parent: String },
    /// No member is placed; the parent becomes the root
    FreshRoot,
}

/// How a new spousal edge fits the existing levels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpousalCase {
    /// The unplaced party takes the placed party's level
    Join { joiner: String, level: Level },
    /// Both are placed on the same level; the edge alone is added
    Aligned,
    /// No member is placed; both partners become roots
    FreshRoot { a: String, b: String },
}

/// Decide which lineage case applies to `parent -> child`
///
/// # Errors
/// Returns the rejection when no case applies.
pub fn classify_lineage(
    snapshot: &RelationSnapshot,
    parent: &str,
    child: &str,
) -> Result<LineageCase, RejectReason> {
    let parent_level = snapshot.level_of(parent);
    let child_level = snapshot.level_of(child);

    match (parent_level.is_placed(), child_level.is_placed()) {
        (false, false) if snapshot.placed().next().is_none() => Ok(LineageCase::FreshRoot),
        (false, false) => Err(RejectReason::NoAnchor),
        (true, false) => Ok(LineageCase::PlaceChild {
            level: parent_level.next(),
        }),
        (false, true) if child_level == Level::ROOT => Ok(LineageCase::NewRoot),
        (false, true) => Err(RejectReason::NonRootChild {
            child: child.to_string(),
            child_level,
        }),
        (true, true) if child_level == parent_level.next() => {
            classify_sibling(snapshot, parent, child)
        }
        (true, true) => Err(RejectReason::InconsistentLevels {
            parent_level,
            child_level,
        }),
    }
}

fn classify_sibling(
    snapshot: &RelationSnapshot,
    parent: &str,
    child: &str,
) -> Result<LineageCase, RejectReason> {
    let co_parent = snapshot
        .member_parents(child)
        .into_iter()
        .find(|candidate| *candidate != parent)
        .ok_or_else(|| RejectReason::NoCoParent {
            child: child.to_string(),
        })?;

    if snapshot.are_related(co_parent, parent) {
        Ok(LineageCase::Sibling {
            co_parent: co_parent.to_string(),
        })
    } else {
        Err(RejectReason::UnrelatedCoParent {
            co_parent: co_parent.to_string(),
        })
    }
}

/// Level writes realising a lineage case
pub fn plan_lineage(
    snapshot: &RelationSnapshot,
    parent: &str,
    child: &str,
    case: &LineageCase,
) -> LevelPlan {
    match case {
        LineageCase::PlaceChild { level } => propagate_assign(snapshot, child, *level),
        LineageCase::NewRoot => {
            let mut plan = shift_placed(snapshot, 1);
            plan.push(parent, Level::ROOT);
            plan
        }
        LineageCase::Sibling { .. } => LevelPlan::new(),
        LineageCase::FreshRoot => {
            let mut plan = propagate_assign(snapshot, parent, Level::ROOT);
            if plan.level_for(child).is_none() {
                let placed = snapshot.with_levels(&plan);
                plan.extend(propagate_assign(&placed, child, Level::ROOT.next()));
            }
            plan
        }
    }
}

/// Decide how a spousal edge between `a` and `b` fits
///
/// # Errors
/// Returns the rejection when the levels cannot be reconciled.
pub fn classify_spousal(
    snapshot: &RelationSnapshot,
    a: &str,
    b: &str,
) -> Result<SpousalCase, RejectReason> {
    let left = snapshot.level_of(a);
    let right = snapshot.level_of(b);

    match (left.is_placed(), right.is_placed()) {
        (false, false) if snapshot.placed().next().is_none() => Ok(SpousalCase::FreshRoot {
            a: a.to_string(),
            b: b.to_string(),
        }),
        (false, false) => Err(RejectReason::NoAnchor),
        (true, false) => Ok(SpousalCase::Join {
            joiner: b.to_string(),
            level: left,
        }),
        (false, true) => Ok(SpousalCase::Join {
            joiner: a.to_string(),
            level: right,
        }),
        (true, true) if left == right => Ok(SpousalCase::Aligned),
        (true, true) => Err(RejectReason::LevelMismatch { left, right }),
    }
}

/// Level writes realising a spousal case
///
/// The joiner alone is placed; its own kin are not pulled along.
pub fn plan_spousal(case: &SpousalCase) -> LevelPlan {
    let mut plan = LevelPlan::new();
    match case {
        SpousalCase::Join { joiner, level } => plan.push(joiner.as_str(), *level),
        SpousalCase::FreshRoot { a, b } => {
            plan.push(a.as_str(), Level::ROOT);
            plan.push(b.as_str(), Level::ROOT);
        }
        SpousalCase::Aligned => {}
    }
    plan
}
