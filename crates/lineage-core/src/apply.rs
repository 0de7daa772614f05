//! Command dispatch
//!
//! `apply()` is the single entry point that maps a `Command` onto the
//! orchestrator operation implementing it.
//!
//! ## Example
//!
//! ```
//! use lineage_core::model::{CharacterRecord, FamilyTreeRecord, Level};
//! use lineage_core::ops::{MemoryStore, RelationshipStore};
//! use lineage_core::{apply, Command};
//!
//! let mut store = MemoryStore::new();
//! store.insert_family_tree(FamilyTreeRecord::new("Stark", None));
//! store.insert_character(CharacterRecord::new("Ned", None));
//!
//! let cmd = Command::Attach {
//!     tree: "Stark".to_string(),
//!     character: "Ned".to_string(),
//! };
//! assert!(apply(&mut store, &cmd).unwrap().is_applied());
//! assert_eq!(store.membership_level("Ned", "Stark").unwrap(), Some(Level::ROOT));
//! ```

use crate::commands::Command;
use crate::errors::Result;
use crate::ops::{
    attach_character, connect_characters, detach_character, disconnect_characters,
    redescribe_relation, retire_character, EditOutcome, RelationshipStore,
};

/// Apply a command to a store
///
/// No locking happens here; see `serial::apply_serialized` when several
/// callers share a store.
///
/// # Errors
///
/// Returns the error of the dispatched operation: not-found conditions or
/// store failures. Rejections are returned as `Ok(EditOutcome::Rejected)`.
pub fn apply(store: &mut dyn RelationshipStore, cmd: &Command) -> Result<EditOutcome> {
    match cmd {
        Command::Attach { tree, character } => attach_character(store, tree, character),

        Command::Detach { tree, character } => detach_character(store, tree, character),

        Command::Connect { tree, a, b, kind } => connect_characters(store, a, b, *kind, tree),

        Command::Disconnect { tree, a, b } => disconnect_characters(store, a, b, tree),

        Command::Redescribe { a, b, kind } => redescribe_relation(store, a, b, *kind),

        Command::Retire { character } => retire_character(store, character),
    }
}
