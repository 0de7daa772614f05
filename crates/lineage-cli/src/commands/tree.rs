//! Family tree commands

use anyhow::Result;
use clap::{Args, Subcommand};
use lineage_core::model::FamilyTreeRecord;

use crate::config::Settings;

#[derive(Debug, Args)]
pub struct TreeArgs {
    #[command(subcommand)]
    pub command: TreeCommand,
}

#[derive(Debug, Subcommand)]
pub enum TreeCommand {
    /// Create an empty family tree
    Create {
        name: String,
        #[arg(long)]
        universe: Option<String>,
    },
    /// List every family tree
    List,
}

pub fn execute(args: TreeArgs, settings: &Settings) -> Result<()> {
    let store = super::open_store(settings)?;

    match args.command {
        TreeCommand::Create { name, universe } => {
            store.create_family_tree(&FamilyTreeRecord::new(name.as_str(), universe))?;
            println!("Created family tree {}", name);
        }
        TreeCommand::List => {
            for tree in store.family_trees()? {
                match tree.universe {
                    Some(universe) => println!("{}\t{}", tree.name, universe),
                    None => println!("{}", tree.name),
                }
            }
        }
    }
    Ok(())
}
