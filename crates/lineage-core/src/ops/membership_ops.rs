use super::store::RelationshipStore;
use super::{
    clear_children_unless, instrumented, require_character, require_member, require_tree,
    shed_edges, write_plan, EditOutcome,
};
use crate::cascade::{propagate_assign, propagate_clear, LevelPlan};
use crate::errors::Result;
use crate::model::{CharacterNode, Level, RelationKind};
use crate::rules::invariants;
use crate::snapshot::{build_snapshot, RelationSnapshot};

/// Attach a character to a family tree
///
/// Kin recorded elsewhere place the character on arrival: one level below
/// its first placed member parent, else on the level of a placed member
/// partner. Without such kin it is placed at level 0 when the tree has no
/// placed member, and joins unplaced (level -1) otherwise. The placement
/// pulls the character's unplaced member kin along, and is dropped for -1
/// when it would misalign kin that are already placed.
///
/// # Arguments
/// * `store` - Relationship store
/// * `tree` - Family tree name
/// * `character` - Character name
///
/// # Returns
/// * `Applied` - The membership edge was created
/// * `Rejected(AlreadyMember)` - The character is already in the tree
/// * `Rejected(TooManyParents)` - A member child of the character already
///   has two member parents, or the character itself would have more than
///   two
///
/// # Errors
/// * `FamilyTreeNotFound` - If the tree does not exist
/// * `CharacterNotFound` - If the character does not exist
/// * store failures, unchanged
pub fn attach_character(
    store: &mut dyn RelationshipStore,
    tree: &str,
    character: &str,
) -> Result<EditOutcome> {
    instrumented("attach_character", Some(tree), character, || {
        attach_character_impl(store, tree, character)
    })
}

fn attach_character_impl(
    store: &mut dyn RelationshipStore,
    tree: &str,
    character: &str,
) -> Result<EditOutcome> {
    require_tree(store, tree)?;
    require_character(store, character)?;

    let snapshot = build_snapshot(store, tree)?;
    let children = store.related(character, RelationKind::Parent)?;
    let parents = store.related(character, RelationKind::Enfant)?;
    if let Err(reason) = invariants::check_attach(&snapshot, character, &children, &parents) {
        return Ok(EditOutcome::Rejected(reason));
    }

    let plan = arrival_plan(store, &snapshot, character)?;
    let level = plan.level_for(character).unwrap_or(Level::UNPLACED);
    store.create_membership(character, tree, level)?;
    write_plan(store, tree, &plan)?;
    Ok(EditOutcome::Applied)
}

/// Level writes placing `character` as it joins, empty to join unplaced
fn arrival_plan(
    store: &dyn RelationshipStore,
    snapshot: &RelationSnapshot,
    character: &str,
) -> Result<LevelPlan> {
    let mut arriving = CharacterNode::new(character);
    for kind in RelationKind::ALL {
        arriving
            .neighbours_mut(kind)
            .extend(store.related(character, kind)?);
    }
    let mut nodes = snapshot.clone().into_nodes();
    nodes.push(arriving);
    let joined = RelationSnapshot::from_nodes(snapshot.tree(), nodes);

    let from_parent = joined
        .placed_parents(character)
        .first()
        .map(|parent| joined.level_of(parent).next());
    let from_partner = || {
        joined
            .member_spousal_partners(character)
            .into_iter()
            .map(|partner| joined.level_of(partner))
            .find(|level| level.is_placed())
    };
    let level = match from_parent.or_else(from_partner) {
        Some(level) => level,
        None if snapshot.placed().next().is_none() => Level::ROOT,
        None => return Ok(LevelPlan::new()),
    };

    let plan = propagate_assign(&joined, character, level);
    let conflicts = invariants::new_level_violations(&joined, &joined.with_levels(&plan));
    if let Some((child, parent)) = conflicts.first() {
        tracing::debug!(
            tree = snapshot.tree(),
            character = character,
            child = child.as_str(),
            parent = parent.as_str(),
            "arrival placement conflicts, joining unplaced"
        );
        return Ok(LevelPlan::new());
    }
    Ok(plan)
}

/// Detach a character from a family tree
///
/// Member children left without any other placed member parent are cleared
/// along with their component. When this was the character's only tree,
/// every kinship and spousal edge it has is deleted too.
///
/// # Errors
/// * `FamilyTreeNotFound` - If the tree does not exist
/// * `CharacterNotFound` - If the character does not exist
/// * `NotAMember` - If the character is not attached to the tree
/// * store failures, unchanged
pub fn detach_character(
    store: &mut dyn RelationshipStore,
    tree: &str,
    character: &str,
) -> Result<EditOutcome> {
    instrumented("detach_character", Some(tree), character, || {
        detach_character_impl(store, tree, character)
    })
}

fn detach_character_impl(
    store: &mut dyn RelationshipStore,
    tree: &str,
    character: &str,
) -> Result<EditOutcome> {
    require_tree(store, tree)?;
    require_character(store, character)?;

    let snapshot = build_snapshot(store, tree)?;
    require_member(&snapshot, character)?;

    let plan = clear_children_unless(&snapshot, character, |current, child| {
        current
            .placed_parents(child)
            .into_iter()
            .any(|parent| parent != character)
    });
    write_plan(store, tree, &plan)?;

    let trees = store.family_trees_of(character)?;
    if trees.iter().all(|t| t == tree) {
        shed_edges(store, character)?;
    }
    store.delete_membership(character, tree)?;
    Ok(EditOutcome::Applied)
}

/// Remove a character from every family tree it belongs to
///
/// In each tree the character's component is cleared first, then every
/// edge and membership of the character is deleted. The character node
/// itself is left for the CRUD layer to delete.
///
/// # Errors
/// * `CharacterNotFound` - If the character does not exist
/// * store failures, unchanged
pub fn retire_character(
    store: &mut dyn RelationshipStore,
    character: &str,
) -> Result<EditOutcome> {
    instrumented("retire_character", None, character, || {
        require_character(store, character)?;
        let trees = store.family_trees_of(character)?;
        retire_character_impl(store, character, &trees)
    })
}

/// Retire a character from the given trees only
///
/// For callers that listed the trees earlier, typically to lock them.
/// Trees the character has left since are skipped.
///
/// # Errors
/// As [`retire_character`].
pub fn retire_character_from(
    store: &mut dyn RelationshipStore,
    character: &str,
    trees: &[String],
) -> Result<EditOutcome> {
    instrumented("retire_character", None, character, || {
        require_character(store, character)?;
        retire_character_impl(store, character, trees)
    })
}

fn retire_character_impl(
    store: &mut dyn RelationshipStore,
    character: &str,
    trees: &[String],
) -> Result<EditOutcome> {
    let mut joined = Vec::with_capacity(trees.len());
    for tree in trees {
        if store.membership_level(character, tree)?.is_some() {
            joined.push(tree.as_str());
        }
    }

    for tree in &joined {
        let snapshot = build_snapshot(store, tree)?;
        let plan = propagate_clear(&snapshot, character);
        write_plan(store, tree, &plan)?;
    }

    shed_edges(store, character)?;
    for tree in &joined {
        store.delete_membership(character, tree)?;
    }
    Ok(EditOutcome::Applied)
}
