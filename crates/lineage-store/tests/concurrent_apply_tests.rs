// Several connections editing one database file through shared tree locks

use std::path::Path;

use lineage_core::model::{CharacterRecord, FamilyTreeRecord, RelationKind};
use lineage_core::ops::{family_snapshot, RelationshipStore};
use lineage_core::rules::invariants;
use lineage_core::{apply_serialized, Command, Level, TreeLocks};
use lineage_store::SqliteStore;

fn seed(path: &Path) {
    let mut store = SqliteStore::open(path).unwrap();
    for tree in ["Stark", "Lannister"] {
        store
            .create_family_tree(&FamilyTreeRecord::new(tree, None))
            .unwrap();
    }
    for name in ["Rickard", "Ned", "Benjen", "Tywin", "Jaime", "Cersei"] {
        store
            .create_character(&CharacterRecord::new(name, None))
            .unwrap();
    }
    let locks = TreeLocks::new();
    for (tree, root) in [("Stark", "Rickard"), ("Lannister", "Tywin")] {
        let cmd = Command::Attach {
            tree: tree.into(),
            character: root.into(),
        };
        apply_serialized(&locks, &mut store, &cmd).unwrap();
    }
}

fn child_of(tree: &str, child: &str, parent: &str) -> Vec<Command> {
    vec![
        Command::Attach {
            tree: tree.into(),
            character: child.into(),
        },
        Command::Connect {
            tree: tree.into(),
            a: child.into(),
            b: parent.into(),
            kind: RelationKind::Enfant,
        },
    ]
}

#[test]
fn test_parallel_edits_on_shared_file() {
    // Given: A seeded file database with a root in each tree
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lineage.db");
    seed(&path);
    let locks = TreeLocks::new();

    // When: Four connections add children concurrently, two per tree
    let work = [
        child_of("Stark", "Ned", "Rickard"),
        child_of("Stark", "Benjen", "Rickard"),
        child_of("Lannister", "Jaime", "Tywin"),
        child_of("Lannister", "Cersei", "Tywin"),
    ];
    std::thread::scope(|scope| {
        for commands in &work {
            let locks = &locks;
            let path = &path;
            scope.spawn(move || {
                let mut store = SqliteStore::open(path).unwrap();
                for cmd in commands {
                    let outcome = apply_serialized(locks, &mut store, cmd).unwrap();
                    assert!(outcome.is_applied(), "{:?}", outcome);
                }
            });
        }
    });

    // Then: Every child sits one level below its root and both trees are clean
    let store = SqliteStore::open(&path).unwrap();
    for (name, tree) in [
        ("Ned", "Stark"),
        ("Benjen", "Stark"),
        ("Jaime", "Lannister"),
        ("Cersei", "Lannister"),
    ] {
        assert_eq!(
            store.membership_level(name, tree).unwrap(),
            Some(Level::new(1)),
            "{} in {}",
            name,
            tree
        );
    }
    for tree in ["Stark", "Lannister"] {
        let snapshot = family_snapshot(&store, tree).unwrap();
        assert_eq!(snapshot.len(), 3);
        assert!(invariants::find_level_violations(&snapshot).is_empty());
    }
    assert_eq!(locks.len(), 2);
}
