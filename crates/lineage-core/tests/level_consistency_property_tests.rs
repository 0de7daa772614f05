#![allow(clippy::unwrap_used, clippy::expect_used)]

/// Random edit sequences on one tree never leave a placed child out of line
/// with a placed parent, and never give a child more than two parents.
mod common;

use common::{store_with, TREE};
use lineage_core::model::RelationKind;
use lineage_core::ops::family_snapshot;
use lineage_core::rules::invariants;
use lineage_core::{apply, Command};
use proptest::prelude::*;

const CAST: [&str; 6] = ["Arya", "Bran", "Catelyn", "Ned", "Robb", "Sansa"];

fn name() -> impl Strategy<Value = String> {
    prop::sample::select(CAST.to_vec()).prop_map(String::from)
}

fn kind() -> impl Strategy<Value = RelationKind> {
    prop::sample::select(RelationKind::ALL.to_vec())
}

fn command() -> impl Strategy<Value = Command> {
    prop_oneof![
        3 => name().prop_map(|character| Command::Attach {
            tree: TREE.to_string(),
            character,
        }),
        1 => name().prop_map(|character| Command::Detach {
            tree: TREE.to_string(),
            character,
        }),
        6 => (name(), name(), kind()).prop_map(|(a, b, kind)| Command::Connect {
            tree: TREE.to_string(),
            a,
            b,
            kind,
        }),
        2 => (name(), name()).prop_map(|(a, b)| Command::Disconnect {
            tree: TREE.to_string(),
            a,
            b,
        }),
        1 => (name(), name(), kind()).prop_map(|(a, b, kind)| Command::Redescribe { a, b, kind }),
        1 => name().prop_map(|character| Command::Retire { character }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_levels_stay_consistent(commands in prop::collection::vec(command(), 1..40)) {
        let mut store = store_with(&CAST);

        for cmd in &commands {
            if let Err(err) = apply(&mut store, cmd) {
                prop_assert!(err.is_precondition(), "{:?} failed with {}", cmd, err);
            }

            let snapshot = family_snapshot(&store, TREE).unwrap();
            let violations = invariants::find_level_violations(&snapshot);
            prop_assert!(violations.is_empty(), "after {:?}: {:?}", cmd, violations);
            let overflows = invariants::find_parent_overflows(&snapshot);
            prop_assert!(overflows.is_empty(), "after {:?}: {:?}", cmd, overflows);
        }
    }

    #[test]
    fn prop_edges_stay_paired(commands in prop::collection::vec(command(), 1..40)) {
        let mut store = store_with(&CAST);

        for cmd in &commands {
            let _ = apply(&mut store, cmd);
        }

        let edges: Vec<(String, String, RelationKind)> = store
            .relations()
            .map(|(from, to, kind)| (from.to_string(), to.to_string(), kind))
            .collect();
        for (from, to, kind) in &edges {
            let back = edges
                .iter()
                .find(|(f, t, _)| f == to && t == from)
                .map(|(_, _, k)| *k);
            prop_assert_eq!(back, Some(kind.inverse()), "{} -[{}]-> {}", from, kind, to);
        }
    }
}
