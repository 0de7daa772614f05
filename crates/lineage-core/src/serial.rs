//! Per-tree serialization of edits
//!
//! Cascades read a snapshot and write levels back in several store calls,
//! so two edits on the same family tree must not interleave. `TreeLocks`
//! hands out one mutex per tree name; edits on different trees proceed in
//! parallel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::apply::apply;
use crate::commands::Command;
use crate::errors::Result;
use crate::ops::{retire_character_from, EditOutcome, RelationshipStore};

/// Registry of per-tree locks
///
/// Locks guard no data, so a lock poisoned by a panicking holder is simply
/// taken over by the next caller.
#[derive(Debug, Default)]
pub struct TreeLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl TreeLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&self, tree: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks
            .entry(tree.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Run `f` while holding the lock of every tree in `trees`
    ///
    /// Locks are taken in sorted name order so overlapping multi-tree
    /// callers cannot deadlock.
    pub fn with_trees<R>(&self, trees: &[String], f: impl FnOnce() -> R) -> R {
        let mut keys: Vec<&str> = trees.iter().map(String::as_str).collect();
        keys.sort_unstable();
        keys.dedup();

        let handles: Vec<Arc<Mutex<()>>> = keys.iter().map(|key| self.handle(key)).collect();
        let _guards: Vec<MutexGuard<'_, ()>> = handles
            .iter()
            .map(|handle| handle.lock().unwrap_or_else(PoisonError::into_inner))
            .collect();

        f()
    }

    /// Number of trees that have been locked at least once
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Apply a command while holding the locks of every tree it touches
///
/// Tree lists that need a store read are taken before the locks. A `Retire`
/// then works on exactly the trees it locked.
///
/// # Errors
/// As [`apply`], plus store failures while resolving the tree list.
pub fn apply_serialized(
    locks: &TreeLocks,
    store: &mut dyn RelationshipStore,
    cmd: &Command,
) -> Result<EditOutcome> {
    let keys = cmd.tree_keys(store)?;
    tracing::debug!(op = cmd.name(), trees = ?keys, "acquiring tree locks");
    locks.with_trees(&keys, || match cmd {
        Command::Retire { character } => retire_character_from(store, character, &keys),
        _ => apply(store, cmd),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CharacterRecord, FamilyTreeRecord, Level, RelationKind};
    use crate::ops::MemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_same_tree_is_exclusive() {
        let locks = TreeLocks::new();
        let inside = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);
        let trees = vec!["Stark".to_string()];

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    locks.with_trees(&trees, || {
                        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        std::thread::sleep(Duration::from_millis(5));
                        inside.fetch_sub(1, Ordering::SeqCst);
                    });
                });
            }
        });

        assert_eq!(peak.load(Ordering::SeqCst), 1);
        assert_eq!(locks.len(), 1);
    }

    #[test]
    fn test_duplicate_keys_do_not_self_deadlock() {
        let locks = TreeLocks::new();
        let trees = vec!["Stark".to_string(), "Stark".to_string(), "Tully".to_string()];
        let value = locks.with_trees(&trees, || 7);
        assert_eq!(value, 7);
        assert_eq!(locks.len(), 2);
    }

    #[test]
    fn test_poisoned_lock_is_recovered() {
        let locks = TreeLocks::new();
        let trees = vec!["Stark".to_string()];

        let result = std::thread::scope(|scope| {
            scope
                .spawn(|| locks.with_trees(&trees, || panic!("holder panicked")))
                .join()
        });
        assert!(result.is_err());

        assert!(locks.with_trees(&trees, || true));
    }

    #[test]
    fn test_serialized_retire_clears_every_locked_tree() {
        let mut store = MemoryStore::new();
        for tree in ["Stark", "Tully"] {
            store.insert_family_tree(FamilyTreeRecord::new(tree, None));
        }
        for name in ["Catelyn", "Robb"] {
            store.insert_character(CharacterRecord::new(name, None));
        }
        store.create_membership("Catelyn", "Stark", Level::ROOT).unwrap();
        store.create_membership("Catelyn", "Tully", Level::ROOT).unwrap();
        store.create_membership("Robb", "Stark", Level::new(1)).unwrap();
        store
            .create_relation("Catelyn", "Robb", RelationKind::Parent)
            .unwrap();
        store
            .create_relation("Robb", "Catelyn", RelationKind::Enfant)
            .unwrap();
        let locks = TreeLocks::new();

        let cmd = Command::Retire {
            character: "Catelyn".to_string(),
        };
        assert!(apply_serialized(&locks, &mut store, &cmd).unwrap().is_applied());

        assert!(store.family_trees_of("Catelyn").unwrap().is_empty());
        assert_eq!(
            store.membership_level("Robb", "Stark").unwrap(),
            Some(Level::UNPLACED)
        );
        assert_eq!(locks.len(), 2);
    }

    #[test]
    fn test_serialized_redescribe_locks_both_parties_trees() {
        let mut store = MemoryStore::new();
        for tree in ["Stark", "Tully"] {
            store.insert_family_tree(FamilyTreeRecord::new(tree, None));
        }
        for name in ["Ned", "Catelyn"] {
            store.insert_character(CharacterRecord::new(name, None));
        }
        store.create_membership("Ned", "Stark", Level::ROOT).unwrap();
        store.create_membership("Catelyn", "Tully", Level::ROOT).unwrap();
        store
            .create_relation("Ned", "Catelyn", RelationKind::Married)
            .unwrap();
        store
            .create_relation("Catelyn", "Ned", RelationKind::Married)
            .unwrap();
        let locks = TreeLocks::new();

        let cmd = Command::Redescribe {
            a: "Ned".to_string(),
            b: "Catelyn".to_string(),
            kind: RelationKind::Divorced,
        };
        assert!(apply_serialized(&locks, &mut store, &cmd).unwrap().is_applied());

        assert_eq!(locks.len(), 2);
        assert_eq!(
            store.relation_between("Catelyn", "Ned").unwrap(),
            Some(RelationKind::Divorced)
        );
    }
}
