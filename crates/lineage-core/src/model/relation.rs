use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::LineageError;

/// The fixed kinship/spousal vocabulary
///
/// An edge `a -[kind]-> b` reads "a is `kind` of b": `a -[Parent]-> b` means
/// a is b's parent and is always paired with `b -[Enfant]-> a`. Spousal kinds
/// are stored in both directions with the same label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    #[serde(rename = "Parent")]
    Parent,
    #[serde(rename = "Enfant")]
    Enfant,
    #[serde(rename = "Marrié")]
    Married,
    #[serde(rename = "Divorcé")]
    Divorced,
    #[serde(rename = "En couple")]
    Coupled,
    #[serde(rename = "Amant")]
    Affair,
}

impl RelationKind {
    pub const ALL: [RelationKind; 6] = [
        RelationKind::Parent,
        RelationKind::Enfant,
        RelationKind::Married,
        RelationKind::Divorced,
        RelationKind::Coupled,
        RelationKind::Affair,
    ];

    pub const SPOUSAL: [RelationKind; 4] = [
        RelationKind::Married,
        RelationKind::Divorced,
        RelationKind::Coupled,
        RelationKind::Affair,
    ];

    /// Stored label
    pub fn label(&self) -> &'static str {
        match self {
            RelationKind::Parent => "Parent",
            RelationKind::Enfant => "Enfant",
            RelationKind::Married => "Marrié",
            RelationKind::Divorced => "Divorcé",
            RelationKind::Coupled => "En couple",
            RelationKind::Affair => "Amant",
        }
    }

    pub fn is_lineage(&self) -> bool {
        matches!(self, RelationKind::Parent | RelationKind::Enfant)
    }

    pub fn is_spousal(&self) -> bool {
        !self.is_lineage()
    }

    /// Kind of the complementary edge written in the opposite direction
    pub fn inverse(&self) -> RelationKind {
        match self {
            RelationKind::Parent => RelationKind::Enfant,
            RelationKind::Enfant => RelationKind::Parent,
            other => *other,
        }
    }
}

impl std::fmt::Display for RelationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RelationKind {
    type Err = LineageError;

    /// Labels are matched case-insensitively; stored data contains both
    /// `Amant` and `amant`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        RelationKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.label().to_lowercase() == trimmed.to_lowercase())
            .ok_or_else(|| LineageError::InvalidRelationKind {
                label: s.to_string(),
            })
    }
}

/// A directed, typed edge between two characters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub from: String,
    pub to: String,
    pub kind: RelationKind,
}

impl Relation {
    pub fn new(from: impl Into<String>, to: impl Into<String>, kind: RelationKind) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind,
        }
    }

    /// The edge written alongside this one in the opposite direction
    pub fn complement(&self) -> Relation {
        Relation {
            from: self.to.clone(),
            to: self.from.clone(),
            kind: self.kind.inverse(),
        }
    }
}
