pub mod character;
pub mod family_tree;
pub mod level;
pub mod relation;

pub use character::{CharacterNode, CharacterRecord};
pub use family_tree::{FamilyTreeRecord, Membership};
pub use level::Level;
pub use relation::{Relation, RelationKind};
