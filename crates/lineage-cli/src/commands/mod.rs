pub mod batch;
pub mod character;
pub mod edit;
pub mod inspect;
pub mod tree;

use anyhow::{Context, Result};
use lineage_store::SqliteStore;

use crate::config::Settings;

/// Open the configured database, creating its directory if needed
pub fn open_store(settings: &Settings) -> Result<SqliteStore> {
    if let Some(parent) = settings.db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create store directory: {}", parent.display())
            })?;
        }
    }
    SqliteStore::open(&settings.db_path)
        .with_context(|| format!("Failed to open store: {}", settings.db_path.display()))
}
