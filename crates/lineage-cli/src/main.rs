//! Lineage CLI
//!
//! Command-line interface over a SQLite lineage store

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod config;

use config::{Config, Settings};

#[derive(Debug, Parser)]
#[command(name = "lineage")]
#[command(about = "Lineage - family tree consistency engine", long_about = None)]
struct Cli {
    /// Configuration file (defaults to $LINEAGE_CONFIG, then ./lineage.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database file, overriding `[store] db_path`
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Logging profile, overriding `[logging] profile`
    #[arg(long, global = true)]
    log_profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Family tree operations
    Tree(commands::tree::TreeArgs),
    /// Character operations
    Character(commands::character::CharacterArgs),
    /// Attach a character to a family tree
    Attach(commands::edit::MembershipArgs),
    /// Detach a character from a family tree
    Detach(commands::edit::MembershipArgs),
    /// Relate two characters: `<a> <kind> <b>` reads "a is kind of b"
    Connect(commands::edit::ConnectArgs),
    /// Remove the relation between two characters
    Disconnect(commands::edit::DisconnectArgs),
    /// Change the label of an existing relation
    Redescribe(commands::edit::RedescribeArgs),
    /// Remove a character from every family tree
    Retire(commands::edit::RetireArgs),
    /// Print the snapshot of a family tree as JSON
    Show(commands::inspect::TreeRef),
    /// Run the integrity finders over a family tree
    Check(commands::inspect::TreeRef),
    /// Apply a JSON array of commands
    Batch(commands::batch::BatchArgs),
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let settings: Settings = config.resolve(cli.db, cli.log_profile.as_deref())?;
    lineage_core::logging_facility::init(settings.profile);

    match cli.command {
        Commands::Tree(args) => commands::tree::execute(args, &settings),
        Commands::Character(args) => commands::character::execute(args, &settings),
        Commands::Attach(args) => commands::edit::execute(args.attach(), &settings),
        Commands::Detach(args) => commands::edit::execute(args.detach(), &settings),
        Commands::Connect(args) => commands::edit::execute(args.into(), &settings),
        Commands::Disconnect(args) => commands::edit::execute(args.into(), &settings),
        Commands::Redescribe(args) => commands::edit::execute(args.into(), &settings),
        Commands::Retire(args) => commands::edit::execute(args.into(), &settings),
        Commands::Show(args) => commands::inspect::show(args, &settings),
        Commands::Check(args) => commands::inspect::check(args, &settings),
        Commands::Batch(args) => commands::batch::execute(args, &settings),
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
