//! `storyline sync` — run one reconciliation pass.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use storyline_api::ApiClient;
use storyline_core::{LocalStore, SyncConfig};
use storyline_sync::{run_sync, RecordAction, SyncReport};

/// Arguments for `storyline sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Board to sync from.
    #[arg(long)]
    pub board: String,

    /// Base URL of the board service.
    #[arg(long)]
    pub base_url: String,

    /// API token.
    #[arg(long, env = "STORYLINE_API_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Content store root (defaults to ~/.storyline).
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Classify every story without writing anything.
    #[arg(long)]
    pub dry_run: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let root = match self.store {
            Some(root) => root,
            None => dirs::home_dir()
                .context("could not determine home directory")?
                .join(".storyline"),
        };
        let store = LocalStore::open(&root)
            .with_context(|| format!("could not open store at {}", root.display()))?;

        let config = SyncConfig::new(self.token, self.base_url, self.board);
        let client = ApiClient::new(&config);
        let report = run_sync(&config, &client, &store, self.dry_run)
            .with_context(|| format!("sync failed for board '{}'", config.board_name))?;

        print_report(&report);
        Ok(())
    }
}

fn print_report(report: &SyncReport) {
    println!("{} {report}", "✓".green());
    for action in &report.actions {
        match action {
            RecordAction::Created { story, .. } | RecordAction::WouldCreate { story } => {
                println!("  {}  story {story}", "+".green());
            }
            RecordAction::Updated { story, trigger, .. }
            | RecordAction::WouldUpdate { story, trigger, .. } => {
                println!("  {}  story {story} ({trigger})", "✎".yellow());
            }
            RecordAction::Deleted { story, .. } | RecordAction::WouldDelete { story, .. } => {
                println!("  {}  story {story}", "-".red());
            }
            RecordAction::DeleteSkipped { story, .. } => {
                println!("  {}  story {story} (delete not permitted)", "·".dimmed());
            }
            RecordAction::Skipped { story, .. } => {
                println!("  {}  story {story}", "·".dimmed());
            }
            RecordAction::Failed { story, reason } => {
                println!("  {}  story {story}: {reason}", "!".red());
            }
        }
    }
}
