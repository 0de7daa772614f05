use lineage_core::errors::{LineageError, Result};
use lineage_core::model::{CharacterRecord, FamilyTreeRecord, Level, RelationKind};
use lineage_core::ops::{attach_character, connect_characters, MemoryStore, RelationshipStore};
use lineage_core::EditOutcome;

pub const TREE: &str = "Stark";

/// Store holding the given characters and an empty `TREE`
#[allow(dead_code)]
pub fn store_with(names: &[&str]) -> MemoryStore {
    let mut store = MemoryStore::new();
    store.insert_family_tree(FamilyTreeRecord::new(TREE, Some("Westeros".to_string())));
    for name in names {
        store.insert_character(CharacterRecord::new(*name, Some("Westeros".to_string())));
    }
    store
}

/// Store where every given character is attached to `TREE`, in order
///
/// The first name therefore sits at level 0 and the others are unplaced.
#[allow(dead_code)]
pub fn tree_with(names: &[&str]) -> MemoryStore {
    let mut store = store_with(names);
    for name in names {
        let outcome = attach_character(&mut store, TREE, name).expect("attach should succeed");
        assert!(outcome.is_applied(), "attach {} was {:?}", name, outcome);
    }
    store
}

/// Level of `name` in `TREE`; non-members read as unplaced
#[allow(dead_code)]
pub fn level(store: &dyn RelationshipStore, name: &str) -> i32 {
    store
        .membership_level(name, TREE)
        .expect("level read should succeed")
        .unwrap_or(Level::UNPLACED)
        .value()
}

/// Connect in `TREE` and insist the edit applies
#[allow(dead_code)]
pub fn connect(store: &mut dyn RelationshipStore, a: &str, b: &str, kind: RelationKind) {
    let outcome = connect_characters(store, a, b, kind, TREE).expect("connect should not fail");
    assert_eq!(
        outcome,
        EditOutcome::Applied,
        "connect {} -[{}]-> {}",
        a,
        kind,
        b
    );
}

/// Connect in `TREE` and return the outcome as is
#[allow(dead_code)]
pub fn try_connect(
    store: &mut dyn RelationshipStore,
    a: &str,
    b: &str,
    kind: RelationKind,
) -> EditOutcome {
    connect_characters(store, a, b, kind, TREE).expect("connect should not fail")
}

/// MemoryStore wrapper that fails writes on demand
///
/// `level_writes_left` counts successful `set_membership_level` calls still
/// allowed; once it reaches zero every further call fails with a store error.
#[allow(dead_code)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub level_writes_left: Option<usize>,
    pub fail_relation_writes: bool,
}

#[allow(dead_code)]
impl FlakyStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            level_writes_left: None,
            fail_relation_writes: false,
        }
    }

    fn injected(op: &str) -> LineageError {
        LineageError::store(op, "injected failure")
    }
}

impl RelationshipStore for FlakyStore {
    fn find_character(&self, name: &str) -> Result<Option<CharacterRecord>> {
        self.inner.find_character(name)
    }

    fn find_family_tree(&self, tree: &str) -> Result<Option<FamilyTreeRecord>> {
        self.inner.find_family_tree(tree)
    }

    fn related(&self, name: &str, kind: RelationKind) -> Result<Vec<String>> {
        self.inner.related(name, kind)
    }

    fn relation_between(&self, from: &str, to: &str) -> Result<Option<RelationKind>> {
        self.inner.relation_between(from, to)
    }

    fn family_members(&self, tree: &str) -> Result<Vec<String>> {
        self.inner.family_members(tree)
    }

    fn family_trees_of(&self, name: &str) -> Result<Vec<String>> {
        self.inner.family_trees_of(name)
    }

    fn membership_level(&self, name: &str, tree: &str) -> Result<Option<Level>> {
        self.inner.membership_level(name, tree)
    }

    fn set_membership_level(&mut self, name: &str, tree: &str, level: Level) -> Result<()> {
        match self.level_writes_left {
            Some(0) => return Err(Self::injected("set_membership_level")),
            Some(ref mut left) => *left -= 1,
            None => {}
        }
        self.inner.set_membership_level(name, tree, level)
    }

    fn create_relation(&mut self, from: &str, to: &str, kind: RelationKind) -> Result<()> {
        if self.fail_relation_writes {
            return Err(Self::injected("create_relation"));
        }
        self.inner.create_relation(from, to, kind)
    }

    fn delete_relation(&mut self, from: &str, to: &str) -> Result<()> {
        if self.fail_relation_writes {
            return Err(Self::injected("delete_relation"));
        }
        self.inner.delete_relation(from, to)
    }

    fn set_relation_kind(&mut self, from: &str, to: &str, kind: RelationKind) -> Result<()> {
        self.inner.set_relation_kind(from, to, kind)
    }

    fn create_membership(&mut self, name: &str, tree: &str, level: Level) -> Result<()> {
        self.inner.create_membership(name, tree, level)
    }

    fn delete_membership(&mut self, name: &str, tree: &str) -> Result<()> {
        self.inner.delete_membership(name, tree)
    }

    fn rename_character(&mut self, old_name: &str, new_name: &str) -> Result<()> {
        self.inner.rename_character(old_name, new_name)
    }
}
