//! Command types for every engine edit
//!
//! A `Command` names one edit intent; `apply()` dispatches it to the
//! orchestrator. Commands deserialize from JSON so batches can be replayed.

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::model::RelationKind;
use crate::ops::RelationshipStore;

/// Every mutating engine operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    /// Attach a character to a family tree
    Attach { tree: String, character: String },

    /// Detach a character from a family tree
    Detach { tree: String, character: String },

    /// Add the edge "`a` is `kind` of `b`" and maintain `tree` levels
    Connect {
        tree: String,
        a: String,
        b: String,
        kind: RelationKind,
    },

    /// Remove the edge pair between `a` and `b`
    Disconnect { tree: String, a: String, b: String },

    /// Change the label of the relation between `a` and `b`
    Redescribe {
        a: String,
        b: String,
        kind: RelationKind,
    },

    /// Remove a character from every tree it belongs to
    Retire { character: String },
}

impl Command {
    /// Operation name used in logs and CLI output
    pub fn name(&self) -> &'static str {
        match self {
            Command::Attach { .. } => "attach_character",
            Command::Detach { .. } => "detach_character",
            Command::Connect { .. } => "connect_characters",
            Command::Disconnect { .. } => "disconnect_characters",
            Command::Redescribe { .. } => "redescribe_relation",
            Command::Retire { .. } => "retire_character",
        }
    }

    /// Family trees whose levels the command may touch, sorted
    ///
    /// `Redescribe` covers every tree of either party, whose cascades read
    /// the edge pair it rewrites. `Retire` covers every tree the
    /// character currently belongs to. Both require store reads.
    ///
    /// # Errors
    /// Store failures while listing a character's trees.
    pub fn tree_keys(&self, store: &dyn RelationshipStore) -> Result<Vec<String>> {
        let mut keys = match self {
            Command::Attach { tree, .. }
            | Command::Detach { tree, .. }
            | Command::Connect { tree, .. }
            | Command::Disconnect { tree, .. } => vec![tree.clone()],
            Command::Redescribe { a, b, .. } => {
                let mut keys = store.family_trees_of(a)?;
                keys.extend(store.family_trees_of(b)?);
                keys
            }
            Command::Retire { character } => store.family_trees_of(character)?,
        };
        keys.sort();
        keys.dedup();
        Ok(keys)
    }
}
