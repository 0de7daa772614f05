use crate::model::RelationKind;
use crate::outcome::RejectReason;
use crate::snapshot::RelationSnapshot;

/// Maximum number of member parents a character may have in one tree
pub const MAX_PARENTS: usize = 2;

/// Check that `character` may be attached to the snapshot's tree
///
/// `children` and `parents` are the character's kin as read from the store;
/// only those already in the tree matter.
pub fn check_attach(
    snapshot: &RelationSnapshot,
    character: &str,
    children: &[String],
    parents: &[String],
) -> Result<(), RejectReason> {
    if snapshot.contains(character) {
        return Err(RejectReason::AlreadyMember {
            character: character.to_string(),
        });
    }
    let member_parents = parents.iter().filter(|p| snapshot.contains(p)).count();
    if member_parents > MAX_PARENTS {
        return Err(RejectReason::TooManyParents {
            child: character.to_string(),
        });
    }
    for child in children.iter().filter(|child| snapshot.contains(child)) {
        let parents = snapshot.member_parents(child);
        if parents.len() >= MAX_PARENTS && !parents.contains(&character) {
            return Err(RejectReason::TooManyParents {
                child: child.clone(),
            });
        }
    }
    Ok(())
}

/// Check that `a -[kind]-> b` may be added between two members
pub fn check_connect(
    snapshot: &RelationSnapshot,
    a: &str,
    b: &str,
    kind: RelationKind,
) -> Result<(), RejectReason> {
    if a == b {
        return Err(RejectReason::SelfRelation {
            character: a.to_string(),
        });
    }
    if let Some(existing) = existing_relation(snapshot, a, b) {
        return Err(RejectReason::DuplicateRelation { existing });
    }

    if kind.is_lineage() {
        let child = if kind == RelationKind::Parent { b } else { a };
        check_parent_capacity(snapshot, child)
    } else {
        check_spouse_available(snapshot, a)?;
        check_spouse_available(snapshot, b)
    }
}

/// Reject when `child` already has the maximum number of member parents
pub fn check_parent_capacity(
    snapshot: &RelationSnapshot,
    child: &str,
) -> Result<(), RejectReason> {
    if snapshot.member_parents(child).len() >= MAX_PARENTS {
        Err(RejectReason::TooManyParents {
            child: child.to_string(),
        })
    } else {
        Ok(())
    }
}

/// Reject when `character` already has a spousal partner in the tree
pub fn check_spouse_available(
    snapshot: &RelationSnapshot,
    character: &str,
) -> Result<(), RejectReason> {
    match snapshot.member_spousal_partners(character).first() {
        Some(partner) => Err(RejectReason::SpouseAlreadyPresent {
            character: character.to_string(),
            partner: partner.to_string(),
        }),
        None => Ok(()),
    }
}

/// Kind of any edge already linking the two names, looked up from both sides
///
/// The kind is reported as read from `a`'s side.
pub fn existing_relation(
    snapshot: &RelationSnapshot,
    a: &str,
    b: &str,
) -> Option<RelationKind> {
    let forward = snapshot.get(a).and_then(|node| {
        RelationKind::ALL
            .into_iter()
            .find(|kind| node.neighbours(*kind).contains(b))
    });
    forward.or_else(|| {
        snapshot.get(b).and_then(|node| {
            RelationKind::ALL
                .into_iter()
                .find(|kind| node.neighbours(*kind).contains(a))
                .map(|kind| kind.inverse())
        })
    })
}

/// Find placed `(child, parent)` pairs whose levels are not one apart
pub fn find_level_violations(snapshot: &RelationSnapshot) -> Vec<(String, String)> {
    let mut violations = Vec::new();
    for child in snapshot.placed() {
        for parent in snapshot.placed_parents(&child.name) {
            if snapshot.level_of(parent).next() != child.level {
                violations.push((child.name.clone(), parent.to_string()));
            }
        }
    }
    violations
}

/// Level violations present in `next` but not in `current`
pub fn new_level_violations(
    current: &RelationSnapshot,
    next: &RelationSnapshot,
) -> Vec<(String, String)> {
    let before = find_level_violations(current);
    find_level_violations(next)
        .into_iter()
        .filter(|pair| !before.contains(pair))
        .collect()
}

/// Find members with more than the allowed number of member parents
pub fn find_parent_overflows(snapshot: &RelationSnapshot) -> Vec<(String, Vec<String>)> {
    snapshot
        .nodes()
        .filter_map(|node| {
            let parents = snapshot.member_parents(&node.name);
            (parents.len() > MAX_PARENTS).then(|| {
                (
                    node.name.clone(),
                    parents.into_iter().map(str::to_string).collect(),
                )
            })
        })
        .collect()
}

/// Find members with more than one spousal partner present in the tree
pub fn find_spousal_conflicts(snapshot: &RelationSnapshot) -> Vec<(String, Vec<String>)> {
    snapshot
        .nodes()
        .filter_map(|node| {
            let partners = snapshot.member_spousal_partners(&node.name);
            (partners.len() > 1).then(|| {
                (
                    node.name.clone(),
                    partners.into_iter().map(str::to_string).collect(),
                )
            })
        })
        .collect()
}

/// Find placed married partners sitting on different levels
///
/// Each pair is reported once, in name order.
pub fn find_spouse_level_mismatches(snapshot: &RelationSnapshot) -> Vec<(String, String)> {
    let mut mismatches = Vec::new();
    for node in snapshot.placed() {
        for partner in node.married.iter().filter(|p| node.name < **p) {
            let partner_level = snapshot.level_of(partner);
            if partner_level.is_placed() && partner_level != node.level {
                mismatches.push((node.name.clone(), partner.clone()));
            }
        }
    }
    mismatches
}
