//! Error handling for lineage-store
//!
//! SQLite failures surface as `LineageError::Store` so the engine propagates
//! them unchanged.

use lineage_core::errors::LineageError;

/// Result type alias using LineageError
pub type Result<T> = std::result::Result<T, LineageError>;

/// Create a store error from rusqlite::Error
pub fn from_rusqlite(op: &str, err: rusqlite::Error) -> LineageError {
    LineageError::store(op, err.to_string())
}

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> LineageError {
    LineageError::store(
        "migration",
        format!("Migration {} failed: {}", migration_id, reason),
    )
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> LineageError {
    LineageError::InconsistentState {
        reason: format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ),
    }
}
