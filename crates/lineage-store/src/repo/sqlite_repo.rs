//! SQLite-backed relationship store
//!
//! Every primitive is one autocommit statement; the engine issues writes one
//! by one and never expects a rollback.

use std::path::Path;

use crate::db;
use crate::errors::{from_rusqlite, Result};
use crate::migrations::apply_migrations;
use lineage_core::errors::LineageError;
use lineage_core::model::{CharacterRecord, FamilyTreeRecord, Level, RelationKind};
use lineage_core::ops::RelationshipStore;
use rusqlite::{params, Connection, OptionalExtension};

/// Relationship store over a single SQLite connection
///
/// Several `SqliteStore`s may open the same database file; edits on one
/// family tree still have to be serialized by the caller (`TreeLocks`).
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path` and migrate it
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_connection(db::open(path)?)
    }

    /// In-memory database, migrated (for tests)
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(db::open_in_memory()?)
    }

    /// Configure and migrate an existing connection
    pub fn from_connection(mut conn: Connection) -> Result<Self> {
        db::configure(&conn)?;
        apply_migrations(&mut conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    // ===== CRUD layer =====

    /// Create a universe; creating an existing one is a no-op
    pub fn create_universe(&self, name: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR IGNORE INTO universes (name, created_at) VALUES (?1, ?2)",
                params![name, chrono::Utc::now().timestamp()],
            )
            .map_err(|e| from_rusqlite("create_universe", e))?;
        Ok(())
    }

    /// Names of every universe, sorted
    pub fn universes(&self) -> Result<Vec<String>> {
        self.names("universes", "SELECT name FROM universes ORDER BY name", [])
    }

    /// Create a character node
    ///
    /// The universe, when named, is created on the fly.
    ///
    /// # Errors
    /// * `AlreadyExists` - If a character with that name exists
    pub fn create_character(&self, record: &CharacterRecord) -> Result<()> {
        if self.find_character(&record.name)?.is_some() {
            return Err(LineageError::AlreadyExists {
                entity: format!("character {}", record.name),
            });
        }
        if let Some(universe) = &record.universe {
            self.create_universe(universe)?;
        }
        self.conn
            .execute(
                "INSERT INTO characters (name, universe, created_at) VALUES (?1, ?2, ?3)",
                params![record.name, record.universe, chrono::Utc::now().timestamp()],
            )
            .map_err(|e| from_rusqlite("create_character", e))?;
        Ok(())
    }

    /// Create a family tree
    ///
    /// # Errors
    /// * `AlreadyExists` - If a tree with that name exists
    pub fn create_family_tree(&self, record: &FamilyTreeRecord) -> Result<()> {
        if self.find_family_tree(&record.name)?.is_some() {
            return Err(LineageError::AlreadyExists {
                entity: format!("family tree {}", record.name),
            });
        }
        if let Some(universe) = &record.universe {
            self.create_universe(universe)?;
        }
        self.conn
            .execute(
                "INSERT INTO family_trees (name, universe, created_at) VALUES (?1, ?2, ?3)",
                params![record.name, record.universe, chrono::Utc::now().timestamp()],
            )
            .map_err(|e| from_rusqlite("create_family_tree", e))?;
        Ok(())
    }

    /// Every family tree, sorted by name
    pub fn family_trees(&self) -> Result<Vec<FamilyTreeRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, universe FROM family_trees ORDER BY name")
            .map_err(|e| from_rusqlite("family_trees", e))?;
        let trees = stmt
            .query_map([], |row| {
                Ok(FamilyTreeRecord::new(row.get::<_, String>(0)?, row.get(1)?))
            })
            .map_err(|e| from_rusqlite("family_trees", e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| from_rusqlite("family_trees", e))?;
        Ok(trees)
    }

    /// Delete a character node; its edges and memberships go with it
    ///
    /// Levels of the remaining members are not revisited; retire the
    /// character through the engine first to keep them consistent.
    ///
    /// # Errors
    /// * `CharacterNotFound` - If the character does not exist
    pub fn delete_character(&self, name: &str) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM characters WHERE name = ?1", [name])
            .map_err(|e| from_rusqlite("delete_character", e))?;
        if deleted == 0 {
            return Err(LineageError::CharacterNotFound {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn names<P: rusqlite::Params>(&self, op: &str, sql: &str, params: P) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(sql).map_err(|e| from_rusqlite(op, e))?;
        let names = stmt
            .query_map(params, |row| row.get(0))
            .map_err(|e| from_rusqlite(op, e))?
            .collect::<std::result::Result<Vec<String>, _>>()
            .map_err(|e| from_rusqlite(op, e))?;
        Ok(names)
    }

    fn require_character(&self, name: &str) -> Result<()> {
        match self.find_character(name)? {
            Some(_) => Ok(()),
            None => Err(LineageError::CharacterNotFound {
                name: name.to_string(),
            }),
        }
    }

    fn require_tree(&self, tree: &str) -> Result<()> {
        match self.find_family_tree(tree)? {
            Some(_) => Ok(()),
            None => Err(LineageError::FamilyTreeNotFound {
                tree: tree.to_string(),
            }),
        }
    }
}

impl RelationshipStore for SqliteStore {
    fn find_character(&self, name: &str) -> Result<Option<CharacterRecord>> {
        self.conn
            .query_row(
                "SELECT name, universe FROM characters WHERE name = ?1",
                [name],
                |row| Ok(CharacterRecord::new(row.get::<_, String>(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|e| from_rusqlite("find_character", e))
    }

    fn find_family_tree(&self, tree: &str) -> Result<Option<FamilyTreeRecord>> {
        self.conn
            .query_row(
                "SELECT name, universe FROM family_trees WHERE name = ?1",
                [tree],
                |row| Ok(FamilyTreeRecord::new(row.get::<_, String>(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|e| from_rusqlite("find_family_tree", e))
    }

    /// Labels are parsed rather than matched in SQL so that legacy lower-case
    /// labels are found too.
    fn related(&self, name: &str, kind: RelationKind) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT to_name, kind FROM relations WHERE from_name = ?1 ORDER BY to_name")
            .map_err(|e| from_rusqlite("related", e))?;
        let rows = stmt
            .query_map([name], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(|e| from_rusqlite("related", e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| from_rusqlite("related", e))?;

        let mut targets = Vec::new();
        for (to, label) in rows {
            if label.parse::<RelationKind>()? == kind {
                targets.push(to);
            }
        }
        Ok(targets)
    }

    fn relation_between(&self, from: &str, to: &str) -> Result<Option<RelationKind>> {
        let label: Option<String> = self
            .conn
            .query_row(
                "SELECT kind FROM relations WHERE from_name = ?1 AND to_name = ?2",
                [from, to],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| from_rusqlite("relation_between", e))?;
        label.map(|label| label.parse()).transpose()
    }

    fn family_members(&self, tree: &str) -> Result<Vec<String>> {
        self.names(
            "family_members",
            "SELECT character FROM memberships WHERE tree = ?1 ORDER BY character",
            [tree],
        )
    }

    fn family_trees_of(&self, name: &str) -> Result<Vec<String>> {
        self.names(
            "family_trees_of",
            "SELECT tree FROM memberships WHERE character = ?1 ORDER BY tree",
            [name],
        )
    }

    fn membership_level(&self, name: &str, tree: &str) -> Result<Option<Level>> {
        let level: Option<i32> = self
            .conn
            .query_row(
                "SELECT level FROM memberships WHERE character = ?1 AND tree = ?2",
                [name, tree],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| from_rusqlite("membership_level", e))?;
        Ok(level.map(Level::new))
    }

    fn set_membership_level(&mut self, name: &str, tree: &str, level: Level) -> Result<()> {
        let updated = self
            .conn
            .execute(
                "UPDATE memberships SET level = ?3 WHERE character = ?1 AND tree = ?2",
                params![name, tree, level.value()],
            )
            .map_err(|e| from_rusqlite("set_membership_level", e))?;
        if updated == 0 {
            return Err(LineageError::NotAMember {
                name: name.to_string(),
                tree: tree.to_string(),
            });
        }
        Ok(())
    }

    fn create_relation(&mut self, from: &str, to: &str, kind: RelationKind) -> Result<()> {
        self.require_character(from)?;
        self.require_character(to)?;
        if self.relation_between(from, to)?.is_some() {
            return Err(LineageError::AlreadyExists {
                entity: format!("relation {} -> {}", from, to),
            });
        }
        self.conn
            .execute(
                "INSERT INTO relations (from_name, to_name, kind) VALUES (?1, ?2, ?3)",
                params![from, to, kind.label()],
            )
            .map_err(|e| from_rusqlite("create_relation", e))?;
        Ok(())
    }

    fn delete_relation(&mut self, from: &str, to: &str) -> Result<()> {
        let deleted = self
            .conn
            .execute(
                "DELETE FROM relations WHERE from_name = ?1 AND to_name = ?2",
                [from, to],
            )
            .map_err(|e| from_rusqlite("delete_relation", e))?;
        if deleted == 0 {
            return Err(LineageError::RelationNotFound {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        Ok(())
    }

    fn set_relation_kind(&mut self, from: &str, to: &str, kind: RelationKind) -> Result<()> {
        let updated = self
            .conn
            .execute(
                "UPDATE relations SET kind = ?3 WHERE from_name = ?1 AND to_name = ?2",
                params![from, to, kind.label()],
            )
            .map_err(|e| from_rusqlite("set_relation_kind", e))?;
        if updated == 0 {
            return Err(LineageError::RelationNotFound {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        Ok(())
    }

    fn create_membership(&mut self, name: &str, tree: &str, level: Level) -> Result<()> {
        self.require_character(name)?;
        self.require_tree(tree)?;
        if self.membership_level(name, tree)?.is_some() {
            return Err(LineageError::AlreadyExists {
                entity: format!("membership {} in {}", name, tree),
            });
        }
        self.conn
            .execute(
                "INSERT INTO memberships (character, tree, level) VALUES (?1, ?2, ?3)",
                params![name, tree, level.value()],
            )
            .map_err(|e| from_rusqlite("create_membership", e))?;
        Ok(())
    }

    fn delete_membership(&mut self, name: &str, tree: &str) -> Result<()> {
        let deleted = self
            .conn
            .execute(
                "DELETE FROM memberships WHERE character = ?1 AND tree = ?2",
                [name, tree],
            )
            .map_err(|e| from_rusqlite("delete_membership", e))?;
        if deleted == 0 {
            return Err(LineageError::NotAMember {
                name: name.to_string(),
                tree: tree.to_string(),
            });
        }
        Ok(())
    }

    /// Foreign keys carry the new name into relations and memberships
    fn rename_character(&mut self, old_name: &str, new_name: &str) -> Result<()> {
        self.require_character(old_name)?;
        if self.find_character(new_name)?.is_some() {
            return Err(LineageError::AlreadyExists {
                entity: format!("character {}", new_name),
            });
        }
        self.conn
            .execute(
                "UPDATE characters SET name = ?2 WHERE name = ?1",
                [old_name, new_name],
            )
            .map_err(|e| from_rusqlite("rename_character", e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(names: &[&str]) -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .create_family_tree(&FamilyTreeRecord::new("Stark", Some("Westeros".into())))
            .unwrap();
        for name in names {
            store
                .create_character(&CharacterRecord::new(*name, Some("Westeros".into())))
                .unwrap();
        }
        store
    }

    #[test]
    fn test_create_character_twice_is_refused() {
        let store = store_with(&["Ned"]);
        let err = store
            .create_character(&CharacterRecord::new("Ned", None))
            .unwrap_err();
        assert!(matches!(err, LineageError::AlreadyExists { .. }));
        assert_eq!(store.universes().unwrap(), vec!["Westeros"]);
    }

    #[test]
    fn test_related_filters_by_kind() {
        let mut store = store_with(&["Ned", "Robb", "Catelyn"]);
        store
            .create_relation("Ned", "Robb", RelationKind::Parent)
            .unwrap();
        store
            .create_relation("Ned", "Catelyn", RelationKind::Married)
            .unwrap();

        assert_eq!(store.related("Ned", RelationKind::Parent).unwrap(), vec!["Robb"]);
        assert_eq!(
            store.related("Ned", RelationKind::Married).unwrap(),
            vec!["Catelyn"]
        );
        assert!(store.related("Ned", RelationKind::Enfant).unwrap().is_empty());
    }

    #[test]
    fn test_legacy_lowercase_labels_are_read() {
        let store = store_with(&["Robb", "Ned"]);
        store
            .connection()
            .execute(
                "INSERT INTO relations (from_name, to_name, kind) VALUES ('Robb', 'Ned', 'enfant')",
                [],
            )
            .unwrap();

        assert_eq!(
            store.relation_between("Robb", "Ned").unwrap(),
            Some(RelationKind::Enfant)
        );
        assert_eq!(store.related("Robb", RelationKind::Enfant).unwrap(), vec!["Ned"]);
    }

    #[test]
    fn test_membership_level_round_trip() {
        let mut store = store_with(&["Ned"]);
        store.create_membership("Ned", "Stark", Level::ROOT).unwrap();
        store
            .set_membership_level("Ned", "Stark", Level::new(3))
            .unwrap();

        assert_eq!(
            store.membership_level("Ned", "Stark").unwrap(),
            Some(Level::new(3))
        );
        assert_eq!(store.family_members("Stark").unwrap(), vec!["Ned"]);
        assert_eq!(store.family_trees_of("Ned").unwrap(), vec!["Stark"]);
    }

    #[test]
    fn test_writes_report_missing_rows() {
        let mut store = store_with(&["Ned", "Robb"]);

        let level = store.set_membership_level("Ned", "Stark", Level::ROOT);
        let relabel = store.set_relation_kind("Ned", "Robb", RelationKind::Divorced);
        let delete = store.delete_relation("Ned", "Robb");

        assert!(matches!(level, Err(LineageError::NotAMember { .. })));
        assert!(matches!(relabel, Err(LineageError::RelationNotFound { .. })));
        assert!(matches!(delete, Err(LineageError::RelationNotFound { .. })));
    }

    #[test]
    fn test_rename_cascades_to_edges_and_memberships() {
        let mut store = store_with(&["Ned", "Robb"]);
        store.create_membership("Ned", "Stark", Level::ROOT).unwrap();
        store
            .create_relation("Ned", "Robb", RelationKind::Parent)
            .unwrap();

        store.rename_character("Ned", "Eddard").unwrap();

        assert!(store.find_character("Ned").unwrap().is_none());
        assert_eq!(
            store.relation_between("Eddard", "Robb").unwrap(),
            Some(RelationKind::Parent)
        );
        assert_eq!(
            store.membership_level("Eddard", "Stark").unwrap(),
            Some(Level::ROOT)
        );
    }

    #[test]
    fn test_delete_character_drops_edges() {
        let mut store = store_with(&["Ned", "Robb"]);
        store
            .create_relation("Robb", "Ned", RelationKind::Enfant)
            .unwrap();

        store.delete_character("Ned").unwrap();

        assert!(store.related("Robb", RelationKind::Enfant).unwrap().is_empty());
        assert!(matches!(
            store.delete_character("Ned"),
            Err(LineageError::CharacterNotFound { .. })
        ));
    }
}
