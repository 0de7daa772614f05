//! Lineage Store - SQLite persistence for the genealogy engine
//!
//! Provides:
//! - Connection setup (foreign keys, WAL, busy timeout)
//! - Embedded, checksummed schema migrations
//! - `SqliteStore`, a `RelationshipStore` over one connection, plus the
//!   universe/character/tree helpers the CRUD layer and tests rely on

pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;

// Re-export key types
pub use errors::Result;
pub use repo::SqliteStore;
