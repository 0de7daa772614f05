use serde::Serialize;

use crate::model::Level;

/// One pending membership level write
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelWrite {
    pub character: String,
    pub level: Level,
}

/// Ordered list of level writes produced by a cascade
///
/// Writes are kept in visit order and applied in that order. A name may
/// appear more than once when plans are concatenated; the last write wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LevelPlan {
    writes: Vec<LevelWrite>,
}

impl LevelPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, character: impl Into<String>, level: Level) {
        self.writes.push(LevelWrite {
            character: character.into(),
            level,
        });
    }

    /// Append every write of `other` after the current ones
    pub fn extend(&mut self, other: LevelPlan) {
        self.writes.extend(other.writes);
    }

    pub fn writes(&self) -> &[LevelWrite] {
        &self.writes
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Level the plan finally gives `character`, if it touches it
    pub fn level_for(&self, character: &str) -> Option<Level> {
        self.writes
            .iter()
            .rev()
            .find(|write| write.character == character)
            .map(|write| write.level)
    }

    pub fn into_writes(self) -> Vec<LevelWrite> {
        self.writes
    }
}
