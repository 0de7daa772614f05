//! Relationship invariants and whole-tree validation

pub mod invariants;
pub mod validation;

pub use validation::{inspect, validate_snapshot, IntegrityReport};
