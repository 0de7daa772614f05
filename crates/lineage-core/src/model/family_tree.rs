use serde::{Deserialize, Serialize};

use super::level::Level;

/// Family tree identity as held by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyTreeRecord {
    /// Unique name
    pub name: String,

    /// Owning universe
    pub universe: Option<String>,
}

impl FamilyTreeRecord {
    pub fn new(name: impl Into<String>, universe: Option<String>) -> Self {
        Self {
            name: name.into(),
            universe,
        }
    }
}

/// Membership edge linking a character to a family tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub character: String,
    pub tree: String,
    pub level: Level,
}
