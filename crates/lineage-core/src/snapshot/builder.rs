use crate::errors::{LineageError, Result};
use crate::model::{CharacterNode, Level, RelationKind};
use crate::ops::RelationshipStore;

use super::RelationSnapshot;

/// Assemble the snapshot of `tree` from point queries
///
/// Issues one `related` query per relation kind per member plus one level
/// query. A tree without members yields an empty snapshot. Store failures
/// propagate unchanged.
///
/// # Errors
/// * `InconsistentState` - If a stored level is below -1
/// * the first store failure encountered
pub fn build_snapshot(store: &dyn RelationshipStore, tree: &str) -> Result<RelationSnapshot> {
    let members = store.family_members(tree)?;
    let mut nodes = Vec::with_capacity(members.len());

    for name in members {
        let mut node = CharacterNode::new(name.as_str());
        for kind in RelationKind::ALL {
            node.neighbours_mut(kind)
                .extend(store.related(&name, kind)?);
        }
        // A membership deleted between the listing and this read reads as unplaced
        node.level = store
            .membership_level(&name, tree)?
            .unwrap_or(Level::UNPLACED);
        if !node.level.is_valid() {
            return Err(LineageError::InconsistentState {
                reason: format!("{} has invalid level {} in {}", name, node.level, tree),
            });
        }
        nodes.push(node);
    }

    tracing::debug!(tree = tree, members = nodes.len(), "snapshot built");
    Ok(RelationSnapshot::from_nodes(tree, nodes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CharacterRecord, FamilyTreeRecord};
    use crate::ops::MemoryStore;

    fn seeded() -> MemoryStore {
        let mut store = MemoryStore::new();
        for name in ["Ned", "Arya", "Robert"] {
            store.insert_character(CharacterRecord::new(name, None));
        }
        store.insert_family_tree(FamilyTreeRecord::new("Stark", None));
        store.create_membership("Ned", "Stark", Level::ROOT).unwrap();
        store.create_membership("Arya", "Stark", Level::new(1)).unwrap();
        store
            .create_relation("Ned", "Arya", RelationKind::Parent)
            .unwrap();
        store
            .create_relation("Arya", "Ned", RelationKind::Enfant)
            .unwrap();
        store
            .create_relation("Ned", "Robert", RelationKind::Coupled)
            .unwrap();
        store
    }

    #[test]
    fn test_empty_tree_yields_empty_snapshot() {
        let mut store = MemoryStore::new();
        store.insert_family_tree(FamilyTreeRecord::new("Lannister", None));
        let snapshot = build_snapshot(&store, "Lannister").unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_members_carry_classified_neighbours() {
        let store = seeded();
        let snapshot = build_snapshot(&store, "Stark").unwrap();

        assert_eq!(snapshot.len(), 2);
        let ned = snapshot.get("Ned").unwrap();
        assert_eq!(ned.level, Level::ROOT);
        assert!(ned.children.contains("Arya"));
        // Non-member neighbours are still recorded on the node
        assert!(ned.coupled.contains("Robert"));

        let arya = snapshot.get("Arya").unwrap();
        assert_eq!(arya.level, Level::new(1));
        assert!(arya.parents.contains("Ned"));
        assert!(!snapshot.contains("Robert"));
    }

    #[test]
    fn test_corrupt_level_is_inconsistent_state() {
        let mut store = seeded();
        store
            .set_membership_level("Arya", "Stark", Level::new(-2))
            .unwrap();

        let err = build_snapshot(&store, "Stark").unwrap_err();
        assert!(matches!(err, LineageError::InconsistentState { .. }), "{:?}", err);
        assert!(err.to_string().contains("Arya"));
    }
}
