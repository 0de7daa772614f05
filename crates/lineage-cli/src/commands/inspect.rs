//! Read-only tree commands

use anyhow::{bail, Result};
use clap::Args;
use lineage_core::errors::LineageError;
use lineage_core::rules::inspect;
use lineage_core::snapshot::{build_snapshot, RelationSnapshot};
use lineage_core::RelationshipStore;
use lineage_store::SqliteStore;

use crate::config::Settings;

#[derive(Debug, Args)]
pub struct TreeRef {
    /// Family tree name
    #[arg(long)]
    pub tree: String,
}

fn snapshot_of(store: &SqliteStore, tree: &str) -> Result<RelationSnapshot> {
    if store.find_family_tree(tree)?.is_none() {
        return Err(LineageError::FamilyTreeNotFound {
            tree: tree.to_string(),
        }
        .into());
    }
    Ok(build_snapshot(store, tree)?)
}

pub fn show(args: TreeRef, settings: &Settings) -> Result<()> {
    let store = super::open_store(settings)?;
    let snapshot = snapshot_of(&store, &args.tree)?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

/// Print the integrity report; findings fail the process
pub fn check(args: TreeRef, settings: &Settings) -> Result<()> {
    let store = super::open_store(settings)?;
    let report = inspect(&snapshot_of(&store, &args.tree)?);
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.is_clean() {
        bail!("Family tree {} has integrity findings", args.tree);
    }
    tracing::info!(tree = %args.tree, "integrity check clean");
    Ok(())
}
