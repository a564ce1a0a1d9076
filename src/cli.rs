use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;
use crate::fields::StoreFormat;

/// Personal and work task tracker.
/// Storage defaults to ~/.tasks/tasks.json, or a path passed via --db.
#[derive(Parser)]
#[command(name = "tasks", version, about = "Track personal and work tasks from the terminal")]
pub struct Cli {
    /// Path to the task store (JSON, CSV or SQLite).
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Store format; guessed from the --db extension when omitted.
    #[arg(long, value_enum, global = true)]
    pub format: Option<StoreFormat>,

    /// Path to the config file (default: <data dir>/config.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}
