//! Per-tree relation snapshots.
//!
//! A `RelationSnapshot` is the in-memory view of one family tree that every
//! engine operation reasons over. It is assembled from point queries by
//! [`build_snapshot`] and never written back directly; cascades produce a
//! `LevelPlan` which the orchestrator applies through the store.
//!
//! ## Responsibilities
//!
//! - Materialize every member as a `CharacterNode` with classified neighbours
//! - Answer membership-filtered questions (member parents, placed parents)
//! - Derive successor snapshots from a level plan
//!
//! ## Non-Responsibilities
//!
//! - Persistence (handled by the `RelationshipStore` implementation)
//! - Legality of edits (handled by `rules::invariants`)

pub mod builder;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cascade::LevelPlan;
use crate::model::{CharacterNode, Level};

pub use builder::build_snapshot;

/// Immutable view of one family tree's members and their edges
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationSnapshot {
    tree: String,
    nodes: BTreeMap<String, CharacterNode>,
}

impl RelationSnapshot {
    /// Snapshot with no members
    pub fn empty(tree: impl Into<String>) -> Self {
        Self {
            tree: tree.into(),
            nodes: BTreeMap::new(),
        }
    }

    /// Build a snapshot from already-assembled nodes
    pub fn from_nodes(
        tree: impl Into<String>,
        nodes: impl IntoIterator<Item = CharacterNode>,
    ) -> Self {
        Self {
            tree: tree.into(),
            nodes: nodes
                .into_iter()
                .map(|node| (node.name.clone(), node))
                .collect(),
        }
    }

    pub fn tree(&self) -> &str {
        &self.tree
    }

    pub fn get(&self, name: &str) -> Option<&CharacterNode> {
        self.nodes.get(name)
    }

    /// Whether `name` is a member of the tree
    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Members in name order
    pub fn nodes(&self) -> impl Iterator<Item = &CharacterNode> {
        self.nodes.values()
    }

    /// Placed members in name order
    pub fn placed(&self) -> impl Iterator<Item = &CharacterNode> {
        self.nodes.values().filter(|node| node.is_placed())
    }

    /// Level of a member; non-members read as unplaced
    pub fn level_of(&self, name: &str) -> Level {
        self.nodes
            .get(name)
            .map(|node| node.level)
            .unwrap_or(Level::UNPLACED)
    }

    /// Members that are parents of `child`, in name order
    ///
    /// An edge seen from either side counts, so a half-written pair still
    /// registers.
    pub fn member_parents(&self, child: &str) -> Vec<&str> {
        let declared = self.nodes.get(child).map(|node| &node.parents);
        self.nodes
            .values()
            .filter(|candidate| candidate.name != child)
            .filter(|candidate| {
                candidate.children.contains(child)
                    || declared.is_some_and(|parents| parents.contains(&candidate.name))
            })
            .map(|candidate| candidate.name.as_str())
            .collect()
    }

    /// Member parents of `child` that are placed
    pub fn placed_parents(&self, child: &str) -> Vec<&str> {
        self.member_parents(child)
            .into_iter()
            .filter(|parent| self.level_of(parent).is_placed())
            .collect()
    }

    /// Members that are children of `parent`, in name order
    pub fn member_children(&self, parent: &str) -> Vec<&str> {
        let declared = self.nodes.get(parent).map(|node| &node.children);
        self.nodes
            .values()
            .filter(|candidate| candidate.name != parent)
            .filter(|candidate| {
                candidate.parents.contains(parent)
                    || declared.is_some_and(|children| children.contains(&candidate.name))
            })
            .map(|candidate| candidate.name.as_str())
            .collect()
    }

    /// Members married to `name`, seen from either side, in name order
    pub fn member_married(&self, name: &str) -> Vec<&str> {
        let declared = self.nodes.get(name).map(|node| &node.married);
        self.nodes
            .values()
            .filter(|candidate| candidate.name != name)
            .filter(|candidate| {
                candidate.married.contains(name)
                    || declared.is_some_and(|married| married.contains(&candidate.name))
            })
            .map(|candidate| candidate.name.as_str())
            .collect()
    }

    /// Spousal partners of `name` (any category) that are members
    pub fn member_spousal_partners(&self, name: &str) -> Vec<&str> {
        let Some(node) = self.nodes.get(name) else {
            return Vec::new();
        };
        let mut partners: Vec<&str> = node
            .spousal_partners()
            .filter(|partner| self.contains(partner))
            .map(String::as_str)
            .collect();
        partners.sort_unstable();
        partners.dedup();
        partners
    }

    /// Whether any edge links the two names, seen from either side
    pub fn are_related(&self, a: &str, b: &str) -> bool {
        let forward = self.nodes.get(a).is_some_and(|node| node.is_related_to(b));
        let backward = self.nodes.get(b).is_some_and(|node| node.is_related_to(a));
        forward || backward
    }

    /// Successor snapshot with every planned write applied in order
    ///
    /// Writes for names that are not members are ignored.
    pub fn with_levels(&self, plan: &LevelPlan) -> Self {
        let mut next = self.clone();
        for write in plan.writes() {
            if let Some(node) = next.nodes.get_mut(&write.character) {
                node.level = write.level;
            }
        }
        next
    }

    pub fn into_nodes(self) -> Vec<CharacterNode> {
        self.nodes.into_values().collect()
    }
}
