//! Lineage Core - genealogy consistency engine
//!
//! This crate maintains per-family-tree generational levels and enforces
//! the kinship invariants while characters and relations change:
//! - Character, family tree, relation and level models
//! - The `RelationshipStore` point-query trait and an in-memory store
//! - Relation snapshots assembled from point queries
//! - Level cascades (assign, clear, root shift) and placement classification
//! - Invariant checks and whole-tree integrity finders
//! - Edit orchestration, `Command` dispatch and per-tree serialization

pub mod apply;
pub mod cascade;
pub mod commands;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod ops;
pub mod outcome;
pub mod rules;
pub mod serial;
pub mod snapshot;

#[doc(hidden)]
pub use lineage_core_types::schema as __schema;

// Re-export commonly used types
pub use apply::apply;
pub use commands::Command;
pub use errors::{ExError, ExErrorKind, LineageError, Result};
pub use model::{CharacterNode, Level, RelationKind};
pub use ops::{MemoryStore, RelationshipStore};
pub use outcome::{EditOutcome, RejectReason};
pub use serial::{apply_serialized, TreeLocks};
pub use snapshot::RelationSnapshot;
