use serde::{Deserialize, Serialize};

/// Generational coordinate of a character within one family tree
///
/// `0` is the root generation and `-1` means the character is attached to
/// the tree but not yet placed. Levels are never persisted by the engine
/// outside of the membership edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Level(i32);

impl Level {
    /// Attached but not placed
    pub const UNPLACED: Level = Level(-1);

    /// Root generation
    pub const ROOT: Level = Level(0);

    pub fn new(value: i32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i32 {
        self.0
    }

    pub fn is_placed(&self) -> bool {
        self.0 != Self::UNPLACED.0
    }

    /// Either unplaced or a generation at or below the root
    pub fn is_valid(&self) -> bool {
        self.0 >= Self::UNPLACED.0
    }

    /// The generation directly below this one
    pub fn next(&self) -> Level {
        Level(self.0.saturating_add(1))
    }

    /// Move a placed level by `delta`; unplaced stays unplaced
    ///
    /// Saturates at `i32::MAX` and never goes above the root.
    pub fn shifted(&self, delta: i32) -> Level {
        if self.is_placed() {
            Level(self.0.saturating_add(delta).max(Self::ROOT.0))
        } else {
            *self
        }
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::UNPLACED
    }
}

impl From<i32> for Level {
    fn from(value: i32) -> Self {
        Level(value)
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
