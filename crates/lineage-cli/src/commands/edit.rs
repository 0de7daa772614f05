//! Edit commands
//!
//! Each subcommand builds one engine `Command` and applies it. The outcome
//! is printed as a JSON line; a rejection also fails the process so scripts
//! can tell the two apart.

use std::str::FromStr;

use anyhow::{bail, Result};
use clap::Args;
use lineage_core::{apply, Command, EditOutcome, RelationKind};

use crate::config::Settings;

#[derive(Debug, Args)]
pub struct MembershipArgs {
    /// Family tree name
    #[arg(long)]
    pub tree: String,
    pub character: String,
}

impl MembershipArgs {
    pub fn attach(self) -> Command {
        Command::Attach {
            tree: self.tree,
            character: self.character,
        }
    }

    pub fn detach(self) -> Command {
        Command::Detach {
            tree: self.tree,
            character: self.character,
        }
    }
}

#[derive(Debug, Args)]
pub struct ConnectArgs {
    /// Family tree whose levels are maintained
    #[arg(long)]
    pub tree: String,
    pub a: String,
    /// Parent, Enfant, Marrié, Divorcé, "En couple" or Amant
    #[arg(value_parser = parse_kind)]
    pub kind: RelationKind,
    pub b: String,
}

impl From<ConnectArgs> for Command {
    fn from(args: ConnectArgs) -> Self {
        Command::Connect {
            tree: args.tree,
            a: args.a,
            b: args.b,
            kind: args.kind,
        }
    }
}

#[derive(Debug, Args)]
pub struct DisconnectArgs {
    #[arg(long)]
    pub tree: String,
    pub a: String,
    pub b: String,
}

impl From<DisconnectArgs> for Command {
    fn from(args: DisconnectArgs) -> Self {
        Command::Disconnect {
            tree: args.tree,
            a: args.a,
            b: args.b,
        }
    }
}

#[derive(Debug, Args)]
pub struct RedescribeArgs {
    pub a: String,
    pub b: String,
    /// New label of the `a -> b` edge
    #[arg(value_parser = parse_kind)]
    pub kind: RelationKind,
}

impl From<RedescribeArgs> for Command {
    fn from(args: RedescribeArgs) -> Self {
        Command::Redescribe {
            a: args.a,
            b: args.b,
            kind: args.kind,
        }
    }
}

#[derive(Debug, Args)]
pub struct RetireArgs {
    pub character: String,
}

impl From<RetireArgs> for Command {
    fn from(args: RetireArgs) -> Self {
        Command::Retire {
            character: args.character,
        }
    }
}

fn parse_kind(value: &str) -> std::result::Result<RelationKind, String> {
    RelationKind::from_str(value).map_err(|e| e.to_string())
}

pub fn execute(cmd: Command, settings: &Settings) -> Result<()> {
    let mut store = super::open_store(settings)?;
    let outcome = apply(&mut store, &cmd)?;
    report(&cmd, &outcome)
}

/// Print the outcome; rejections become errors
fn report(cmd: &Command, outcome: &EditOutcome) -> Result<()> {
    println!("{}", serde_json::to_string(outcome)?);
    if let Some(reason) = outcome.rejection() {
        bail!("{} rejected [{}]: {}", cmd.name(), reason.code(), reason);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn test_parse_kind_accepts_any_case() {
        assert_eq!(parse_kind("enfant").unwrap(), RelationKind::Enfant);
        assert_eq!(parse_kind("MARRIÉ").unwrap(), RelationKind::Married);
    }

    #[test]
    fn test_parse_kind_reports_unknown_label() {
        let err = parse_kind("cousin").unwrap_err();
        assert!(err.contains("cousin"), "{}", err);
    }

    #[test]
    fn test_connect_args_keep_edge_direction() {
        let cmd: Command = ConnectArgs {
            tree: "Stark".into(),
            a: "Robb".into(),
            kind: RelationKind::Enfant,
            b: "Ned".into(),
        }
        .into();

        assert_eq!(
            cmd,
            Command::Connect {
                tree: "Stark".into(),
                a: "Robb".into(),
                b: "Ned".into(),
                kind: RelationKind::Enfant,
            }
        );
    }
}
