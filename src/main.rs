//! # tasks - personal and work task tracker
//!
//! A command-line task tracker with three kinds of task: general tasks,
//! personal tasks with a priority, and work tasks with a list of team members.
//! Tasks live in a single local store that can be JSON, CSV or SQLite, and an
//! optional terminal user interface (TUI) browses and edits the same store.
//!
//! ## Quick Start
//!
//! ```bash
//! # Add tasks
//! tasks add "Buy milk" --due 2024-05-01
//! tasks add "Gym" --due 2024-05-02 --kind personal --priority high
//! tasks add "Quarterly report" --due 2024-06-30 --kind work --member Alice --member Bob
//!
//! # Query
//! tasks list --kind work --table
//! tasks pending
//! tasks overdue --as-of 2024-06-01
//!
//! # Launch the TUI
//! tasks ui
//! ```
//!
//! Data is stored in `~/.tasks/` (or `$TASKS_HOME`). `config.toml` in the same
//! directory selects the store format and path, and the log level. Set
//! `TASKS_LOG=debug` to see what the tracker is doing.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod fields;
pub mod format;
pub mod ids;
pub mod manager;
pub mod record;
pub mod store;
pub mod task;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod task_form;
    pub mod utils;
}

use cli::Cli;
use cmd::*;
use config::{data_dir, Config, CONFIG_FILE_NAME, DEFAULT_LOG_LEVEL};
use manager::TaskManager;
use store::open_store;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

/// Log to stderr so command output on stdout stays clean. `TASKS_LOG` wins
/// over the configured level. Fails if a global subscriber is already set.
fn init_logging(config: &Config) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_env("TASKS_LOG")
        .or_else(|_| EnvFilter::try_new(config.log_level()))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish()
        .try_init()
}

fn run(cli: Cli) -> Result<()> {
    // Completions need neither config nor store.
    if let Commands::Completions { shell } = cli.command {
        cmd_completions(shell);
        return Ok(());
    }

    let data_dir = data_dir();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| data_dir.join(CONFIG_FILE_NAME));
    let config = Config::load(&config_path)?;
    if let Err(e) = init_logging(&config) {
        eprintln!("Warning: logging disabled: {e}");
    }

    let location = config.resolve_store(cli.db.as_deref(), cli.format, &data_dir);
    debug!(path = %location.path.display(), format = %location.format, "using task store");

    let mut store = open_store(location.format, &location.path);
    let (mut manager, report) = TaskManager::from_store(store.as_mut())
        .with_context(|| format!("failed to load tasks from {}", store.describe()))?;
    if report.store_missing {
        eprintln!("No task file found, starting with an empty list.");
    }
    if !report.skipped.is_empty() {
        eprintln!(
            "Warning: skipped {} invalid task record(s) in {}",
            report.skipped.len(),
            location.path.display()
        );
    }

    // The browser takes ownership of the collection and its store.
    if let Commands::Ui = cli.command {
        return cmd_ui(manager, store);
    }

    let store_path: &Path = &location.path;
    let store_mut = store.as_mut();

    match cli.command {
        Commands::Completions { .. } => unreachable!("completions handled above"),

        Commands::Add { title, due, desc, kind, priority, members } =>
            cmd_add(&mut manager, store_mut, title, due, desc, kind, priority, members),

        Commands::List { kind, table } => {
            cmd_list(&manager, kind, table);
            Ok(())
        }

        Commands::View { id } => cmd_view(&manager, id),

        Commands::Complete { id } => cmd_complete(&mut manager, store_mut, id),

        Commands::Describe { id, text } => cmd_describe(&mut manager, store_mut, id, text),

        Commands::Priority { id, level } => cmd_priority(&mut manager, store_mut, id, level),

        Commands::Member { id, name } => cmd_member(&mut manager, store_mut, id, name),

        Commands::Delete { id } => cmd_delete(&mut manager, store_mut, id),

        Commands::Pending => {
            cmd_pending(&manager);
            Ok(())
        }

        Commands::Overdue { as_of } => cmd_overdue(&manager, as_of),

        Commands::Export { output, to } => cmd_export(&manager, output, to),

        Commands::Import { input, from, no_backup } =>
            cmd_import(&mut manager, store_mut, store_path, input, from, no_backup),

        Commands::Backup => cmd_backup(store_path),

        Commands::Ui => unreachable!("ui handled above"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_logging_init_is_reported() {
        let config = Config::default();
        init_logging(&config).ok();
        assert!(init_logging(&config).is_err());
    }
}
