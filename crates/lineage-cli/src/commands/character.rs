//! Character commands

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use lineage_core::model::CharacterRecord;
use lineage_core::{apply, Command, RelationshipStore};

use crate::config::Settings;

#[derive(Debug, Args)]
pub struct CharacterArgs {
    #[command(subcommand)]
    pub command: CharacterCommand,
}

#[derive(Debug, Subcommand)]
pub enum CharacterCommand {
    /// Create a character
    Create {
        name: String,
        #[arg(long)]
        universe: Option<String>,
    },
    /// Rename a character; relations and memberships follow
    Rename { old_name: String, new_name: String },
    /// Retire a character from every tree, then delete it
    Delete { name: String },
}

pub fn execute(args: CharacterArgs, settings: &Settings) -> Result<()> {
    let mut store = super::open_store(settings)?;

    match args.command {
        CharacterCommand::Create { name, universe } => {
            store.create_character(&CharacterRecord::new(name.as_str(), universe))?;
            println!("Created character {}", name);
        }
        CharacterCommand::Rename { old_name, new_name } => {
            store.rename_character(&old_name, &new_name)?;
            println!("Renamed {} to {}", old_name, new_name);
        }
        CharacterCommand::Delete { name } => {
            let retire = Command::Retire {
                character: name.clone(),
            };
            if let Some(reason) = apply(&mut store, &retire)?.rejection() {
                bail!("Cannot retire {} [{}]: {}", name, reason.code(), reason);
            }
            store.delete_character(&name)?;
            println!("Deleted character {}", name);
        }
    }
    Ok(())
}
