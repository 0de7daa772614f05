use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::level::Level;
use super::relation::RelationKind;

/// Character identity as held by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRecord {
    /// Unique display name (the kinship store keys on it)
    pub name: String,

    /// Universe the character was cast in
    pub universe: Option<String>,
}

impl CharacterRecord {
    pub fn new(name: impl Into<String>, universe: Option<String>) -> Self {
        Self {
            name: name.into(),
            universe,
        }
    }
}

/// A family tree member with its classified neighbours
///
/// Neighbour sets hold every related name the store returned, whether or not
/// that character is a member of the same tree. Checks that care about the
/// tree's population filter through the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CharacterNode {
    pub name: String,
    pub children: BTreeSet<String>,
    pub parents: BTreeSet<String>,
    pub married: BTreeSet<String>,
    pub divorced: BTreeSet<String>,
    pub coupled: BTreeSet<String>,
    pub affair: BTreeSet<String>,
    pub level: Level,
}

impl CharacterNode {
    /// Create an unplaced node with no neighbours
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder-style level setter, mostly for fixtures
    pub fn at_level(mut self, level: impl Into<Level>) -> Self {
        self.level = level.into();
        self
    }

    pub fn is_placed(&self) -> bool {
        self.level.is_placed()
    }

    /// Neighbour set for a relation kind as seen from this node
    ///
    /// Outgoing `Parent` edges point at children and outgoing `Enfant` edges
    /// at parents.
    pub fn neighbours(&self, kind: RelationKind) -> &BTreeSet<String> {
        match kind {
            RelationKind::Parent => &self.children,
            RelationKind::Enfant => &self.parents,
            RelationKind::Married => &self.married,
            RelationKind::Divorced => &self.divorced,
            RelationKind::Coupled => &self.coupled,
            RelationKind::Affair => &self.affair,
        }
    }

    pub fn neighbours_mut(&mut self, kind: RelationKind) -> &mut BTreeSet<String> {
        match kind {
            RelationKind::Parent => &mut self.children,
            RelationKind::Enfant => &mut self.parents,
            RelationKind::Married => &mut self.married,
            RelationKind::Divorced => &mut self.divorced,
            RelationKind::Coupled => &mut self.coupled,
            RelationKind::Affair => &mut self.affair,
        }
    }

    /// Every spousal partner regardless of category
    pub fn spousal_partners(&self) -> impl Iterator<Item = &String> {
        self.married
            .iter()
            .chain(self.divorced.iter())
            .chain(self.coupled.iter())
            .chain(self.affair.iter())
    }

    /// Whether any edge of any kind links this node to `other`
    pub fn is_related_to(&self, other: &str) -> bool {
        RelationKind::ALL
            .iter()
            .any(|kind| self.neighbours(*kind).contains(other))
    }
}
