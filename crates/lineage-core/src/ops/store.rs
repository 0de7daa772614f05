use std::collections::BTreeMap;

use crate::errors::{LineageError, Result};
use crate::model::{CharacterRecord, FamilyTreeRecord, Level, Membership, RelationKind};

/// Point-query/point-write interface to the relationship store
///
/// The engine never asks for traversals; it assembles graphs from repeated
/// calls to these primitives. Every read returns a value, an empty result, or
/// an error. Every call is keyed by display name.
pub trait RelationshipStore {
    /// Find a character node by name
    fn find_character(&self, name: &str) -> Result<Option<CharacterRecord>>;

    /// Find a family tree by name
    fn find_family_tree(&self, tree: &str) -> Result<Option<FamilyTreeRecord>>;

    /// Targets of `name`'s outgoing edges of `kind`, sorted by name
    fn related(&self, name: &str, kind: RelationKind) -> Result<Vec<String>>;

    /// Kind of the `from -> to` edge, if any
    fn relation_between(&self, from: &str, to: &str) -> Result<Option<RelationKind>>;

    /// Names of every character attached to `tree`, sorted
    fn family_members(&self, tree: &str) -> Result<Vec<String>>;

    /// Names of every tree `name` is attached to, sorted
    fn family_trees_of(&self, name: &str) -> Result<Vec<String>>;

    /// Level carried by the membership edge, `None` when not a member
    fn membership_level(&self, name: &str, tree: &str) -> Result<Option<Level>>;

    /// Overwrite the level carried by an existing membership edge
    fn set_membership_level(&mut self, name: &str, tree: &str, level: Level) -> Result<()>;

    /// Create a single directed edge
    fn create_relation(&mut self, from: &str, to: &str, kind: RelationKind) -> Result<()>;

    /// Delete the single directed `from -> to` edge
    fn delete_relation(&mut self, from: &str, to: &str) -> Result<()>;

    /// Relabel the existing `from -> to` edge
    fn set_relation_kind(&mut self, from: &str, to: &str, kind: RelationKind) -> Result<()>;

    /// Attach a character to a family tree
    fn create_membership(&mut self, name: &str, tree: &str, level: Level) -> Result<()>;

    /// Detach a character from a family tree
    fn delete_membership(&mut self, name: &str, tree: &str) -> Result<()>;

    /// Rename a character node, keeping every edge
    ///
    /// Used by the character detail update flow, never by a cascade.
    fn rename_character(&mut self, old_name: &str, new_name: &str) -> Result<()>;
}

/// In-memory relationship store
///
/// BTreeMap-backed so every listing is name-ordered. Not thread-safe;
/// share it behind the caller's own lock.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    characters: BTreeMap<String, CharacterRecord>,
    trees: BTreeMap<String, FamilyTreeRecord>,
    /// (from, to) -> kind; at most one edge per ordered pair
    relations: BTreeMap<(String, String), RelationKind>,
    /// (character, tree) -> level
    memberships: BTreeMap<(String, String), Level>,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a character node (CRUD layer / test setup)
    pub fn insert_character(&mut self, record: CharacterRecord) {
        self.characters.insert(record.name.clone(), record);
    }

    /// Insert a family tree (CRUD layer / test setup)
    pub fn insert_family_tree(&mut self, record: FamilyTreeRecord) {
        self.trees.insert(record.name.clone(), record);
    }

    /// Remove a character node together with every edge touching it
    pub fn remove_character(&mut self, name: &str) -> Result<()> {
        if self.characters.remove(name).is_none() {
            return Err(LineageError::CharacterNotFound {
                name: name.to_string(),
            });
        }
        self.relations.retain(|(from, to), _| from != name && to != name);
        self.memberships.retain(|(character, _), _| character != name);
        Ok(())
    }

    /// Every stored edge, ordered by (from, to)
    pub fn relations(&self) -> impl Iterator<Item = (&str, &str, RelationKind)> {
        self.relations
            .iter()
            .map(|((from, to), kind)| (from.as_str(), to.as_str(), *kind))
    }

    /// Every membership edge, ordered by (character, tree)
    pub fn memberships(&self) -> Vec<Membership> {
        self.memberships
            .iter()
            .map(|((character, tree), level)| Membership {
                character: character.clone(),
                tree: tree.clone(),
                level: *level,
            })
            .collect()
    }

    fn require_character(&self, name: &str) -> Result<()> {
        if self.characters.contains_key(name) {
            Ok(())
        } else {
            Err(LineageError::CharacterNotFound {
                name: name.to_string(),
            })
        }
    }

    fn require_tree(&self, tree: &str) -> Result<()> {
        if self.trees.contains_key(tree) {
            Ok(())
        } else {
            Err(LineageError::FamilyTreeNotFound {
                tree: tree.to_string(),
            })
        }
    }
}

fn pair(a: &str, b: &str) -> (String, String) {
    (a.to_string(), b.to_string())
}

impl RelationshipStore for MemoryStore {
    fn find_character(&self, name: &str) -> Result<Option<CharacterRecord>> {
        Ok(self.characters.get(name).cloned())
    }

    fn find_family_tree(&self, tree: &str) -> Result<Option<FamilyTreeRecord>> {
        Ok(self.trees.get(tree).cloned())
    }

    fn related(&self, name: &str, kind: RelationKind) -> Result<Vec<String>> {
        Ok(self
            .relations
            .iter()
            .filter(|((from, _), k)| from == name && **k == kind)
            .map(|((_, to), _)| to.clone())
            .collect())
    }

    fn relation_between(&self, from: &str, to: &str) -> Result<Option<RelationKind>> {
        Ok(self.relations.get(&pair(from, to)).copied())
    }

    fn family_members(&self, tree: &str) -> Result<Vec<String>> {
        Ok(self
            .memberships
            .keys()
            .filter(|(_, t)| t == tree)
            .map(|(character, _)| character.clone())
            .collect())
    }

    fn family_trees_of(&self, name: &str) -> Result<Vec<String>> {
        let mut trees: Vec<String> = self
            .memberships
            .keys()
            .filter(|(character, _)| character == name)
            .map(|(_, tree)| tree.clone())
            .collect();
        trees.sort();
        Ok(trees)
    }

    fn membership_level(&self, name: &str, tree: &str) -> Result<Option<Level>> {
        Ok(self.memberships.get(&pair(name, tree)).copied())
    }

    fn set_membership_level(&mut self, name: &str, tree: &str, level: Level) -> Result<()> {
        match self.memberships.get_mut(&pair(name, tree)) {
            Some(slot) => {
                *slot = level;
                Ok(())
            }
            None => Err(LineageError::NotAMember {
                name: name.to_string(),
                tree: tree.to_string(),
            }),
        }
    }

    fn create_relation(&mut self, from: &str, to: &str, kind: RelationKind) -> Result<()> {
        self.require_character(from)?;
        self.require_character(to)?;
        let key = pair(from, to);
        if self.relations.contains_key(&key) {
            return Err(LineageError::AlreadyExists {
                entity: format!("relation {} -> {}", from, to),
            });
        }
        self.relations.insert(key, kind);
        Ok(())
    }

    fn delete_relation(&mut self, from: &str, to: &str) -> Result<()> {
        self.relations
            .remove(&pair(from, to))
            .map(|_| ())
            .ok_or_else(|| LineageError::RelationNotFound {
                from: from.to_string(),
                to: to.to_string(),
            })
    }

    fn set_relation_kind(&mut self, from: &str, to: &str, kind: RelationKind) -> Result<()> {
        match self.relations.get_mut(&pair(from, to)) {
            Some(slot) => {
                *slot = kind;
                Ok(())
            }
            None => Err(LineageError::RelationNotFound {
                from: from.to_string(),
                to: to.to_string(),
            }),
        }
    }

    fn create_membership(&mut self, name: &str, tree: &str, level: Level) -> Result<()> {
        self.require_character(name)?;
        self.require_tree(tree)?;
        let key = pair(name, tree);
        if self.memberships.contains_key(&key) {
            return Err(LineageError::AlreadyExists {
                entity: format!("membership {} in {}", name, tree),
            });
        }
        self.memberships.insert(key, level);
        Ok(())
    }

    fn delete_membership(&mut self, name: &str, tree: &str) -> Result<()> {
        self.memberships
            .remove(&pair(name, tree))
            .map(|_| ())
            .ok_or_else(|| LineageError::NotAMember {
                name: name.to_string(),
                tree: tree.to_string(),
            })
    }

    fn rename_character(&mut self, old_name: &str, new_name: &str) -> Result<()> {
        let mut record = self
            .characters
            .remove(old_name)
            .ok_or_else(|| LineageError::CharacterNotFound {
                name: old_name.to_string(),
            })?;
        if self.characters.contains_key(new_name) {
            self.characters.insert(old_name.to_string(), record);
            return Err(LineageError::AlreadyExists {
                entity: format!("character {}", new_name),
            });
        }
        record.name = new_name.to_string();
        self.characters.insert(new_name.to_string(), record);

        let rename = |n: &String| {
            if n == old_name {
                new_name.to_string()
            } else {
                n.clone()
            }
        };
        self.relations = std::mem::take(&mut self.relations)
            .into_iter()
            .map(|((from, to), kind)| ((rename(&from), rename(&to)), kind))
            .collect();
        self.memberships = std::mem::take(&mut self.memberships)
            .into_iter()
            .map(|((character, tree), level)| ((rename(&character), tree), level))
            .collect();
        Ok(())
    }
}
