//! Edit orchestration
//!
//! Every mutating operation follows the same shape: validate existence,
//! build a fresh `RelationSnapshot`, run the invariant checks, let the
//! cascade compute a `LevelPlan`, then issue the writes through the store.
//! Rejections come back as `Ok(EditOutcome::Rejected(_))` before any write.

pub mod membership_ops;
pub mod relation_ops;
pub mod store;

use std::time::Instant;

use lineage_core_types::{schema, RequestId};

use crate::cascade::{propagate_clear, LevelPlan};
use crate::errors::{LineageError, Result};
use crate::model::RelationKind;
use crate::snapshot::{build_snapshot, RelationSnapshot};
use crate::{log_op_end, log_op_error, log_op_start};

pub use crate::outcome::{EditOutcome, RejectReason};
pub use membership_ops::{
    attach_character, detach_character, retire_character, retire_character_from,
};
pub use relation_ops::{connect_characters, disconnect_characters, redescribe_relation};
pub use store::{MemoryStore, RelationshipStore};

/// Snapshot of an existing family tree
///
/// # Errors
/// * `FamilyTreeNotFound` - If the tree does not exist
/// * store failures, unchanged
pub fn family_snapshot(store: &dyn RelationshipStore, tree: &str) -> Result<RelationSnapshot> {
    require_tree(store, tree)?;
    build_snapshot(store, tree)
}

/// Run `body` between start and terminal log events
fn instrumented<F>(
    op: &'static str,
    tree: Option<&str>,
    character: &str,
    body: F,
) -> Result<EditOutcome>
where
    F: FnOnce() -> Result<EditOutcome>,
{
    let request_id = RequestId::new();
    log_op_start!(
        op,
        tree = tree,
        character = character,
        request_id = request_id.as_str()
    );
    let start = Instant::now();

    let outcome = body().map_err(|e| {
        log_op_error!(
            op,
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            tree = tree,
            character = character,
            request_id = request_id.as_str()
        );
        e
    })?;

    if let EditOutcome::Rejected(reason) = &outcome {
        tracing::info!(
            component = module_path!(),
            op = op,
            event = schema::EVENT_REJECTED,
            reason = reason.code(),
            detail = %reason,
            request_id = request_id.as_str(),
        );
    }

    log_op_end!(
        op,
        duration_ms = start.elapsed().as_millis() as u64,
        outcome = outcome.label(),
        tree = tree,
        character = character,
        request_id = request_id.as_str()
    );

    Ok(outcome)
}

fn require_tree(store: &dyn RelationshipStore, tree: &str) -> Result<()> {
    match store.find_family_tree(tree)? {
        Some(_) => Ok(()),
        None => Err(LineageError::FamilyTreeNotFound {
            tree: tree.to_string(),
        }),
    }
}

fn require_character(store: &dyn RelationshipStore, name: &str) -> Result<()> {
    match store.find_character(name)? {
        Some(_) => Ok(()),
        None => Err(LineageError::CharacterNotFound {
            name: name.to_string(),
        }),
    }
}

fn require_member(snapshot: &RelationSnapshot, name: &str) -> Result<()> {
    if snapshot.contains(name) {
        Ok(())
    } else {
        Err(LineageError::NotAMember {
            name: name.to_string(),
            tree: snapshot.tree().to_string(),
        })
    }
}

/// Apply a plan write by write; a failure leaves the earlier writes in place
fn write_plan(store: &mut dyn RelationshipStore, tree: &str, plan: &LevelPlan) -> Result<()> {
    for write in plan.writes() {
        store.set_membership_level(&write.character, tree, write.level)?;
    }
    if !plan.is_empty() {
        tracing::debug!(tree = tree, writes = plan.len(), "level plan applied");
    }
    Ok(())
}

/// Delete whichever directions of the `a`/`b` edge pair exist
fn remove_edge_pair(store: &mut dyn RelationshipStore, a: &str, b: &str) -> Result<()> {
    if store.relation_between(a, b)?.is_some() {
        store.delete_relation(a, b)?;
    }
    if store.relation_between(b, a)?.is_some() {
        store.delete_relation(b, a)?;
    }
    Ok(())
}

/// Delete every kinship and spousal edge touching `name`
fn shed_edges(store: &mut dyn RelationshipStore, name: &str) -> Result<()> {
    for kind in RelationKind::ALL {
        for other in store.related(name, kind)? {
            remove_edge_pair(store, name, &other)?;
        }
    }
    Ok(())
}

/// Clear the placed member children of `parent` that `keep` does not vouch for
///
/// Children are processed in name order against a snapshot updated after
/// each clear, so a shared descendant is written once.
fn clear_children_unless<F>(snapshot: &RelationSnapshot, parent: &str, keep: F) -> LevelPlan
where
    F: Fn(&RelationSnapshot, &str) -> bool,
{
    let mut plan = LevelPlan::new();
    let mut current = snapshot.clone();
    for child in snapshot.member_children(parent) {
        if !current.level_of(child).is_placed() || keep(&current, child) {
            continue;
        }
        let step = propagate_clear(&current, child);
        current = current.with_levels(&step);
        plan.extend(step);
    }
    plan
}
