//! Batch replay of JSON commands
//!
//! The input is a JSON array of engine commands, e.g.
//! `[{"op": "attach", "tree": "Stark", "character": "Ned"}]`. Commands run
//! in order; a rejection is reported and the batch carries on, an error
//! stops it.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use lineage_core::{apply_serialized, Command, EditOutcome, TreeLocks};
use serde::Serialize;

use crate::config::Settings;

#[derive(Debug, Args)]
pub struct BatchArgs {
    /// JSON file holding an array of commands
    pub file: PathBuf,
}

/// One printed line per command
#[derive(Debug, Serialize)]
struct BatchLine<'a> {
    index: usize,
    op: &'a str,
    result: &'a EditOutcome,
}

pub fn execute(args: BatchArgs, settings: &Settings) -> Result<()> {
    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read batch file: {}", args.file.display()))?;
    let commands: Vec<Command> = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse batch file: {}", args.file.display()))?;

    let mut store = super::open_store(settings)?;
    let locks = TreeLocks::new();
    let mut rejected = 0usize;

    for (index, cmd) in commands.iter().enumerate() {
        let outcome = apply_serialized(&locks, &mut store, cmd)
            .with_context(|| format!("Command #{} ({}) failed", index, cmd.name()))?;
        if !outcome.is_applied() {
            rejected += 1;
        }
        let line = BatchLine {
            index,
            op: cmd.name(),
            result: &outcome,
        };
        println!("{}", serde_json::to_string(&line)?);
    }

    tracing::info!(
        commands = commands.len(),
        rejected = rejected,
        "batch complete"
    );
    Ok(())
}
