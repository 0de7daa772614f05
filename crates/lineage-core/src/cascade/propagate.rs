use std::collections::BTreeSet;

use lineage_core_types::schema;

use crate::model::Level;
use crate::snapshot::RelationSnapshot;

use super::plan::LevelPlan;

/// Place `start` at `level` and pull its unplaced component along
///
/// Depth-first over the snapshot: married partners still at -1 join at the
/// same level, children still at -1 go one level down. `start` itself is
/// written unconditionally. Each name is visited once per pass.
pub fn propagate_assign(snapshot: &RelationSnapshot, start: &str, level: Level) -> LevelPlan {
    walk(snapshot, start, level, |candidate| !candidate.is_placed(), true)
}

/// Mark `start` and its placed component as unplaced
///
/// Visits married partners and children whose level is not -1. Neither is
/// checked for another anchor; a child keeping a second placed parent is
/// cleared all the same.
pub fn propagate_clear(snapshot: &RelationSnapshot, start: &str) -> LevelPlan {
    walk(
        snapshot,
        start,
        Level::UNPLACED,
        |candidate| candidate.is_placed(),
        false,
    )
}

/// Move every placed member by `delta`, in name order
pub fn shift_placed(snapshot: &RelationSnapshot, delta: i32) -> LevelPlan {
    let mut plan = LevelPlan::new();
    for node in snapshot.placed() {
        plan.push(node.name.as_str(), node.level.shifted(delta));
    }
    plan
}

fn walk(
    snapshot: &RelationSnapshot,
    start: &str,
    level: Level,
    eligible: impl Fn(Level) -> bool,
    descend: bool,
) -> LevelPlan {
    let mut plan = LevelPlan::new();
    let mut visited: BTreeSet<String> = BTreeSet::new();
    let mut stack: Vec<(String, Level)> = vec![(start.to_string(), level)];

    while let Some((name, level)) = stack.pop() {
        if !visited.insert(name.clone()) {
            continue;
        }
        if !snapshot.contains(&name) {
            continue;
        }

        tracing::debug!(
            tree = snapshot.tree(),
            character = name.as_str(),
            level = level.value(),
            event = schema::EVENT_CASCADE_STEP,
        );
        plan.push(name.as_str(), level);

        // Edges count from either side so half-written pairs are followed
        let child_level = if descend { level.next() } else { level };
        let children = snapshot
            .member_children(&name)
            .into_iter()
            .rev()
            .map(|n| (n, child_level));
        let spouses = snapshot
            .member_married(&name)
            .into_iter()
            .rev()
            .map(|n| (n, level));

        // Spouses are pushed last so their branch is explored first
        for (neighbour, next_level) in children.chain(spouses) {
            if visited.contains(neighbour) {
                continue;
            }
            if eligible(snapshot.level_of(neighbour)) {
                stack.push((neighbour.to_string(), next_level));
            }
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CharacterNode;

    fn node(name: &str, level: i32) -> CharacterNode {
        CharacterNode::new(name).at_level(level)
    }

    fn link_parent(parent: &mut CharacterNode, child: &mut CharacterNode) {
        parent.children.insert(child.name.clone());
        child.parents.insert(parent.name.clone());
    }

    fn marry(a: &mut CharacterNode, b: &mut CharacterNode) {
        a.married.insert(b.name.clone());
        b.married.insert(a.name.clone());
    }

    #[test]
    fn test_assign_places_unplaced_component() {
        let mut arya = node("Arya", -1);
        let mut gendry = node("Gendry", -1);
        let mut kid = node("Kid", -1);
        marry(&mut arya, &mut gendry);
        link_parent(&mut arya, &mut kid);
        let snapshot = RelationSnapshot::from_nodes("Stark", [arya, gendry, kid]);

        let plan = propagate_assign(&snapshot, "Arya", Level::new(1));

        assert_eq!(plan.level_for("Arya"), Some(Level::new(1)));
        assert_eq!(plan.level_for("Gendry"), Some(Level::new(1)));
        assert_eq!(plan.level_for("Kid"), Some(Level::new(2)));
        assert_eq!(plan.len(), 3);
    }

    #[test]
    fn test_assign_visits_spouse_before_children() {
        let mut arya = node("Arya", -1);
        let mut gendry = node("Gendry", -1);
        let mut kid = node("Kid", -1);
        marry(&mut arya, &mut gendry);
        link_parent(&mut arya, &mut kid);
        let snapshot = RelationSnapshot::from_nodes("Stark", [arya, gendry, kid]);

        let plan = propagate_assign(&snapshot, "Arya", Level::ROOT);
        let order: Vec<_> = plan.writes().iter().map(|w| w.character.as_str()).collect();
        assert_eq!(order, vec!["Arya", "Gendry", "Kid"]);
    }

    #[test]
    fn test_assign_skips_placed_neighbours() {
        let mut ned = node("Ned", 0);
        let mut jon = node("Jon", 1);
        link_parent(&mut ned, &mut jon);
        let snapshot = RelationSnapshot::from_nodes("Stark", [ned, jon]);

        let plan = propagate_assign(&snapshot, "Ned", Level::new(3));
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.level_for("Jon"), None);
    }

    #[test]
    fn test_assign_terminates_on_cycles() {
        let mut a = node("A", -1);
        let mut b = node("B", -1);
        marry(&mut a, &mut b);
        link_parent(&mut a, &mut b);
        let snapshot = RelationSnapshot::from_nodes("T", [a, b]);

        let plan = propagate_assign(&snapshot, "A", Level::ROOT);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.level_for("B"), Some(Level::ROOT));
    }

    #[test]
    fn test_assign_ignores_non_member_neighbours() {
        let mut ned = node("Ned", -1);
        ned.children.insert("Outsider".to_string());
        let snapshot = RelationSnapshot::from_nodes("Stark", [ned]);

        let plan = propagate_assign(&snapshot, "Ned", Level::ROOT);
        assert_eq!(plan.len(), 1);
    }

    #[test]
    fn test_clear_reaches_placed_descendants() {
        let mut ned = node("Ned", 0);
        let mut cat = node("Catelyn", 0);
        let mut robb = node("Robb", 1);
        let mut heir = node("Heir", 2);
        marry(&mut ned, &mut cat);
        link_parent(&mut ned, &mut robb);
        link_parent(&mut robb, &mut heir);
        let snapshot = RelationSnapshot::from_nodes("Stark", [ned, cat, robb, heir]);

        let plan = propagate_clear(&snapshot, "Ned");

        for name in ["Ned", "Catelyn", "Robb", "Heir"] {
            assert_eq!(plan.level_for(name), Some(Level::UNPLACED), "{}", name);
        }
    }

    #[test]
    fn test_clear_does_not_recheck_second_parent() {
        let mut ned = node("Ned", 0);
        let mut cat = node("Catelyn", 0);
        let mut robb = node("Robb", 1);
        link_parent(&mut ned, &mut robb);
        link_parent(&mut cat, &mut robb);
        let snapshot = RelationSnapshot::from_nodes("Stark", [ned, cat, robb]);

        let plan = propagate_clear(&snapshot, "Ned");
        assert_eq!(plan.level_for("Robb"), Some(Level::UNPLACED));
        assert_eq!(plan.level_for("Catelyn"), None);
    }

    #[test]
    fn test_clear_skips_unplaced_neighbours() {
        let mut ned = node("Ned", 0);
        let mut jon = node("Jon", -1);
        link_parent(&mut ned, &mut jon);
        let snapshot = RelationSnapshot::from_nodes("Stark", [ned, jon]);

        let plan = propagate_clear(&snapshot, "Ned");
        assert_eq!(plan.len(), 1);
    }

    #[test]
    fn test_assign_follows_edges_written_on_one_side() {
        // Only the child and the second spouse hold the edge
        let ned = node("Ned", -1);
        let mut robb = node("Robb", -1);
        let mut cat = node("Catelyn", -1);
        robb.parents.insert("Ned".to_string());
        cat.married.insert("Ned".to_string());
        let snapshot = RelationSnapshot::from_nodes("Stark", [ned, robb, cat]);

        let plan = propagate_assign(&snapshot, "Ned", Level::ROOT);

        assert_eq!(plan.level_for("Catelyn"), Some(Level::ROOT));
        assert_eq!(plan.level_for("Robb"), Some(Level::new(1)));
    }

    #[test]
    fn test_clear_follows_edges_written_on_one_side() {
        let ned = node("Ned", 0);
        let mut robb = node("Robb", 1);
        robb.parents.insert("Ned".to_string());
        let snapshot = RelationSnapshot::from_nodes("Stark", [ned, robb]);

        let plan = propagate_clear(&snapshot, "Ned");
        assert_eq!(plan.level_for("Robb"), Some(Level::UNPLACED));
    }

    #[test]
    fn test_shift_moves_only_placed_members() {
        let snapshot =
            RelationSnapshot::from_nodes("Stark", [node("A", 0), node("B", 2), node("C", -1)]);

        let plan = shift_placed(&snapshot, 1);

        assert_eq!(plan.level_for("A"), Some(Level::new(1)));
        assert_eq!(plan.level_for("B"), Some(Level::new(3)));
        assert_eq!(plan.level_for("C"), None);
    }
}
