//! Repository layer persisting the engine's graph to SQLite

pub mod sqlite_repo;

pub use sqlite_repo::SqliteStore;
