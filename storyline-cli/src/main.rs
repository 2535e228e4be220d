//! Storyline — board-to-store sync CLI.
//!
//! # Usage
//!
//! ```text
//! storyline sync --board <name> --base-url <url> [--token <token>] [--store <dir>] [--dry-run]
//! ```
//!
//! The API token can also be supplied via `STORYLINE_API_TOKEN`. Log output
//! is controlled with `RUST_LOG` (env_logger).

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::sync::SyncArgs;

#[derive(Parser, Debug)]
#[command(
    name = "storyline",
    version,
    about = "Sync a remote story board into the local content store",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one reconciliation pass against the configured board.
    Sync(SyncArgs),
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Sync(args) => args.run(),
    }
}
