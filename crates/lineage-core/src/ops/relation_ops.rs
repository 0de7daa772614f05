use super::store::RelationshipStore;
use super::{
    clear_children_unless, instrumented, remove_edge_pair, require_character, require_member,
    require_tree, write_plan, EditOutcome, RejectReason,
};
use crate::cascade::{
    classify_lineage, classify_spousal, plan_lineage, plan_spousal, propagate_clear, LevelPlan,
};
use crate::errors::{LineageError, Result};
use crate::model::{Level, RelationKind};
use crate::rules::invariants;
use crate::snapshot::{build_snapshot, RelationSnapshot};

/// Connect two members of a family tree
///
/// `kind` reads "`a` is `kind` of `b`": `Parent` makes `a` the parent of
/// `b`, `Enfant` makes `a` the child. The level plan is written before the
/// edge pair is created.
///
/// # Arguments
/// * `store` - Relationship store
/// * `a` - First character
/// * `b` - Second character
/// * `kind` - Relation from `a` to `b`
/// * `tree` - Family tree whose levels are maintained
///
/// # Returns
/// `Applied`, or `Rejected` with the reason when the edge would break an
/// invariant, cannot be placed, or its cascade would misalign kin that are
/// already placed. Nothing is written on rejection.
///
/// # Errors
/// * `FamilyTreeNotFound` - If the tree does not exist
/// * `CharacterNotFound` - If either character does not exist
/// * `NotAMember` - If either character is not attached to the tree
/// * store failures, unchanged
pub fn connect_characters(
    store: &mut dyn RelationshipStore,
    a: &str,
    b: &str,
    kind: RelationKind,
    tree: &str,
) -> Result<EditOutcome> {
    instrumented("connect_characters", Some(tree), a, || {
        connect_characters_impl(store, a, b, kind, tree)
    })
}

fn connect_characters_impl(
    store: &mut dyn RelationshipStore,
    a: &str,
    b: &str,
    kind: RelationKind,
    tree: &str,
) -> Result<EditOutcome> {
    require_tree(store, tree)?;
    require_character(store, a)?;
    require_character(store, b)?;

    let snapshot = build_snapshot(store, tree)?;
    require_member(&snapshot, a)?;
    require_member(&snapshot, b)?;

    if let Err(reason) = invariants::check_connect(&snapshot, a, b, kind) {
        return Ok(EditOutcome::Rejected(reason));
    }

    let plan = match plan_connect(&snapshot, a, b, kind) {
        Ok(plan) => plan,
        Err(reason) => return Ok(EditOutcome::Rejected(reason)),
    };
    let conflicts = invariants::new_level_violations(&snapshot, &snapshot.with_levels(&plan));
    if let Some((child, parent)) = conflicts.into_iter().next() {
        return Ok(EditOutcome::Rejected(RejectReason::CascadeConflict {
            child,
            parent,
        }));
    }
    write_plan(store, tree, &plan)?;

    store.create_relation(a, b, kind)?;
    store.create_relation(b, a, kind.inverse())?;
    Ok(EditOutcome::Applied)
}

fn plan_connect(
    snapshot: &RelationSnapshot,
    a: &str,
    b: &str,
    kind: RelationKind,
) -> std::result::Result<LevelPlan, RejectReason> {
    if kind.is_lineage() {
        let (parent, child) = if kind == RelationKind::Parent {
            (a, b)
        } else {
            (b, a)
        };
        let case = classify_lineage(snapshot, parent, child)?;
        tracing::debug!(tree = snapshot.tree(), ?case, "lineage case");
        Ok(plan_lineage(snapshot, parent, child, &case))
    } else {
        let case = classify_spousal(snapshot, a, b)?;
        tracing::debug!(tree = snapshot.tree(), ?case, "spousal case");
        Ok(plan_spousal(&case))
    }
}

/// Remove the edge pair between two characters
///
/// The relation kind is read from the stored `a -> b` edge (or derived from
/// `b -> a`). Levels are maintained for whichever party is a member of
/// `tree`.
///
/// Lineage: the child's component is cleared unless the child keeps another
/// placed parent in the tree.
///
/// Spousal: a party with a placed parent in the tree keeps its level. When
/// exactly one party is anchored that way, the other is removed; when neither
/// is, `b` is removed; when both are, nobody moves. The removed party goes to
/// -1 together with the placed children it does not share with the keeper.
///
/// # Errors
/// * `FamilyTreeNotFound` - If the tree does not exist
/// * `CharacterNotFound` - If either character does not exist
/// * `RelationNotFound` - If no edge links the two characters
/// * store failures, unchanged
pub fn disconnect_characters(
    store: &mut dyn RelationshipStore,
    a: &str,
    b: &str,
    tree: &str,
) -> Result<EditOutcome> {
    instrumented("disconnect_characters", Some(tree), a, || {
        disconnect_characters_impl(store, a, b, tree)
    })
}

fn disconnect_characters_impl(
    store: &mut dyn RelationshipStore,
    a: &str,
    b: &str,
    tree: &str,
) -> Result<EditOutcome> {
    require_tree(store, tree)?;
    require_character(store, a)?;
    require_character(store, b)?;

    let kind = stored_kind(store, a, b)?;
    let snapshot = build_snapshot(store, tree)?;

    let plan = if kind.is_lineage() {
        let (parent, child) = if kind == RelationKind::Parent {
            (a, b)
        } else {
            (b, a)
        };
        lineage_release_plan(&snapshot, parent, child)
    } else {
        spousal_release_plan(&snapshot, a, b)
    };
    write_plan(store, tree, &plan)?;

    remove_edge_pair(store, a, b)?;
    Ok(EditOutcome::Applied)
}

/// Kind of the `a -> b` edge, falling back to the inverse of `b -> a`
fn stored_kind(store: &dyn RelationshipStore, a: &str, b: &str) -> Result<RelationKind> {
    if let Some(kind) = store.relation_between(a, b)? {
        return Ok(kind);
    }
    store
        .relation_between(b, a)?
        .map(|kind| kind.inverse())
        .ok_or_else(|| LineageError::RelationNotFound {
            from: a.to_string(),
            to: b.to_string(),
        })
}

fn lineage_release_plan(snapshot: &RelationSnapshot, parent: &str, child: &str) -> LevelPlan {
    if !snapshot.level_of(child).is_placed() {
        return LevelPlan::new();
    }
    let anchored = snapshot
        .placed_parents(child)
        .into_iter()
        .any(|other| other != parent);
    if anchored {
        LevelPlan::new()
    } else {
        propagate_clear(snapshot, child)
    }
}

fn spousal_release_plan(snapshot: &RelationSnapshot, a: &str, b: &str) -> LevelPlan {
    let anchored = |name: &str| !snapshot.placed_parents(name).is_empty();
    let (removed, keeper) = match (anchored(a), anchored(b)) {
        (true, true) => return LevelPlan::new(),
        (false, true) => (a, b),
        (true, false) | (false, false) => (b, a),
    };
    if !snapshot.level_of(removed).is_placed() {
        return LevelPlan::new();
    }

    let mut plan = clear_children_unless(snapshot, removed, |current, child| {
        current.member_parents(child).contains(&keeper)
    });
    plan.push(removed, Level::UNPLACED);
    plan
}

/// Change the label of an existing relation
///
/// Both directions are relabelled; levels never move. Only spousal labels
/// can be exchanged for one another.
///
/// # Returns
/// * `Applied` - The label was changed, or already had that value
/// * `Rejected(IncompatibleRelabel)` - The change would cross between
///   lineage and spousal kinds, or flip a Parent/Enfant edge
///
/// # Errors
/// * `CharacterNotFound` - If either character does not exist
/// * `RelationNotFound` - If no edge links the two characters
/// * store failures, unchanged
pub fn redescribe_relation(
    store: &mut dyn RelationshipStore,
    a: &str,
    b: &str,
    new_kind: RelationKind,
) -> Result<EditOutcome> {
    instrumented("redescribe_relation", None, a, || {
        redescribe_relation_impl(store, a, b, new_kind)
    })
}

fn redescribe_relation_impl(
    store: &mut dyn RelationshipStore,
    a: &str,
    b: &str,
    new_kind: RelationKind,
) -> Result<EditOutcome> {
    require_character(store, a)?;
    require_character(store, b)?;

    let current = stored_kind(store, a, b)?;
    if current == new_kind {
        return Ok(EditOutcome::Applied);
    }
    if !(current.is_spousal() && new_kind.is_spousal()) {
        return Ok(EditOutcome::Rejected(RejectReason::IncompatibleRelabel {
            from: current,
            to: new_kind,
        }));
    }

    if store.relation_between(a, b)?.is_some() {
        store.set_relation_kind(a, b, new_kind)?;
    }
    if store.relation_between(b, a)?.is_some() {
        store.set_relation_kind(b, a, new_kind.inverse())?;
    }
    Ok(EditOutcome::Applied)
}
