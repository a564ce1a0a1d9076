//! Command implementations for the CLI interface.
//!
//! Every handler works on a loaded `TaskManager` and the store it came from.
//! Mutating handlers save the whole collection back before returning, so a
//! validation failure never reaches the store.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::Subcommand;
use clap_complete::{generate, Shell};
use tracing::{debug, info};

use crate::fields::{Kind, StoreFormat};
use crate::format::print_table;
use crate::manager::{LoadReport, TaskManager};
use crate::store::{create_backup, open_store, TaskStore};
use crate::task::{parse_due_date, Task};

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new task.
    Add {
        /// Short title for the task.
        title: String,
        /// Due date as YYYY-MM-DD.
        #[arg(long)]
        due: String,
        /// Optional description (at most 15 characters).
        #[arg(long)]
        desc: Option<String>,
        /// Task kind: general | personal | work.
        #[arg(long, value_enum, default_value_t = Kind::General)]
        kind: Kind,
        /// Priority for personal tasks: low | medium | high (default low).
        #[arg(long)]
        priority: Option<String>,
        /// Team member for work tasks. May be repeated.
        #[arg(long = "member")]
        members: Vec<String>,
    },

    /// List tasks, optionally of one kind.
    List {
        #[arg(long, value_enum)]
        kind: Option<Kind>,
        /// Render as an aligned table instead of one line per task.
        #[arg(long)]
        table: bool,
    },

    /// Show a single task.
    View { id: u64 },

    /// Mark a task as completed.
    Complete { id: u64 },

    /// Replace a task's description.
    Describe { id: u64, text: String },

    /// Change the priority of a personal task.
    Priority { id: u64, level: String },

    /// Add a team member to a work task.
    Member { id: u64, name: String },

    /// Delete a task.
    Delete { id: u64 },

    /// List tasks that are not completed yet.
    Pending,

    /// List tasks due before a date.
    Overdue {
        /// Reference date as YYYY-MM-DD (default: today).
        #[arg(long)]
        as_of: Option<String>,
    },

    /// Write all tasks into another store.
    Export {
        #[arg(long)]
        output: PathBuf,
        /// Target format; guessed from the output extension when omitted.
        #[arg(long, value_enum)]
        to: Option<StoreFormat>,
    },

    /// Replace all tasks with the contents of another store.
    Import {
        input: PathBuf,
        /// Source format; guessed from the input extension when omitted.
        #[arg(long, value_enum)]
        from: Option<StoreFormat>,
        /// Skip the backup of the current store.
        #[arg(long)]
        no_backup: bool,
    },

    /// Create a timestamped backup of the current store.
    Backup,

    /// Generate shell completions.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Launch the interactive task browser.
    Ui,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn print_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>, table: bool) {
    let tasks: Vec<&Task> = tasks.into_iter().collect();
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }
    if table {
        print_table(tasks, today());
    } else {
        for task in tasks {
            println!("{task}");
        }
    }
}

fn save(manager: &TaskManager, store: &mut dyn TaskStore) -> Result<()> {
    manager
        .save_all(store)
        .with_context(|| format!("failed to save tasks to {}", store.describe()))
}

fn report_skipped(report: &LoadReport) {
    for skipped in &report.skipped {
        eprintln!("Skipped {skipped}");
    }
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_add(
    manager: &mut TaskManager,
    store: &mut dyn TaskStore,
    title: String,
    due: String,
    desc: Option<String>,
    kind: Kind,
    priority: Option<String>,
    members: Vec<String>,
) -> Result<()> {
    if priority.is_some() && kind != Kind::Personal {
        bail!("--priority only applies to personal tasks");
    }
    if !members.is_empty() && kind != Kind::Work {
        bail!("--member only applies to work tasks");
    }

    let desc = desc.as_deref();
    let id = match kind {
        Kind::General => manager.create_general(&title, &due, desc)?,
        Kind::Personal => {
            let priority = priority.as_deref().unwrap_or("low");
            manager.create_personal(&title, &due, priority, desc)?
        }
        Kind::Work => manager.create_work(&title, &due, desc, &members)?,
    };
    save(manager, store)?;
    println!("Added {kind} task {id}: {title}");
    Ok(())
}

pub fn cmd_list(manager: &TaskManager, kind: Option<Kind>, table: bool) {
    print_tasks(manager.list(kind), table);
}

pub fn cmd_view(manager: &TaskManager, id: u64) -> Result<()> {
    let Some(task) = manager.get(id) else {
        bail!("task {id} not found");
    };
    println!("{task}");
    Ok(())
}

pub fn cmd_complete(manager: &mut TaskManager, store: &mut dyn TaskStore, id: u64) -> Result<()> {
    manager.complete(id)?;
    save(manager, store)?;
    println!("Task {id} marked as completed.");
    Ok(())
}

pub fn cmd_describe(
    manager: &mut TaskManager,
    store: &mut dyn TaskStore,
    id: u64,
    text: String,
) -> Result<()> {
    manager.require_mut(id)?.set_description(&text)?;
    save(manager, store)?;
    println!("Task {id} description updated.");
    Ok(())
}

pub fn cmd_priority(
    manager: &mut TaskManager,
    store: &mut dyn TaskStore,
    id: u64,
    level: String,
) -> Result<()> {
    let task = manager.require_mut(id)?;
    task.set_priority(&level)?;
    let level = task.priority().map(|p| p.to_string()).unwrap_or_default();
    save(manager, store)?;
    println!("Task {id} priority set to {level}.");
    Ok(())
}

pub fn cmd_member(
    manager: &mut TaskManager,
    store: &mut dyn TaskStore,
    id: u64,
    name: String,
) -> Result<()> {
    manager.require_mut(id)?.add_team_member(&name)?;
    save(manager, store)?;
    println!("Added {} to task {id}.", name.trim());
    Ok(())
}

/// A missing id is reported but is not an error.
pub fn cmd_delete(manager: &mut TaskManager, store: &mut dyn TaskStore, id: u64) -> Result<()> {
    match manager.delete(id) {
        Ok(task) => {
            save(manager, store)?;
            println!("Deleted task {id}: {}", task.title());
        }
        Err(e) => {
            debug!("{e}");
            println!("Task not found.");
        }
    }
    Ok(())
}

pub fn cmd_pending(manager: &TaskManager) {
    print_tasks(manager.pending(), false);
}

pub fn cmd_overdue(manager: &TaskManager, as_of: Option<String>) -> Result<()> {
    let as_of = match as_of {
        Some(s) => parse_due_date(&s)?,
        None => today(),
    };
    print_tasks(manager.overdue(as_of), false);
    Ok(())
}

fn format_for(path: &Path, explicit: Option<StoreFormat>) -> Result<StoreFormat> {
    match explicit.or_else(|| StoreFormat::from_path(path)) {
        Some(format) => Ok(format),
        None => bail!(
            "cannot tell the format of {} from its extension, pass it explicitly",
            path.display()
        ),
    }
}

pub fn cmd_export(manager: &TaskManager, output: PathBuf, to: Option<StoreFormat>) -> Result<()> {
    let format = format_for(&output, to)?;
    let mut target = open_store(format, &output);
    manager
        .save_all(target.as_mut())
        .with_context(|| format!("failed to export to {}", target.describe()))?;
    println!("Exported {} tasks to {}", manager.len(), output.display());
    Ok(())
}

/// Load tasks from `input`, replacing the current collection, and save them
/// into the current store. The current store is backed up first if it exists.
pub fn cmd_import(
    manager: &mut TaskManager,
    store: &mut dyn TaskStore,
    store_path: &Path,
    input: PathBuf,
    from: Option<StoreFormat>,
    no_backup: bool,
) -> Result<()> {
    if !input.exists() {
        bail!("import source {} does not exist", input.display());
    }
    let format = format_for(&input, from)?;

    if !no_backup && store_path.exists() {
        let backup = create_backup(store_path).context("failed to back up the current store")?;
        println!("Created backup: {}", backup.display());
    }

    let mut source = open_store(format, &input);
    let report = manager
        .load_all(source.as_mut())
        .with_context(|| format!("failed to import from {}", source.describe()))?;
    report_skipped(&report);
    save(manager, store)?;

    info!(loaded = report.loaded, skipped = report.skipped.len(), "import finished");
    println!(
        "Imported {} tasks ({} skipped).",
        report.loaded,
        report.skipped.len()
    );
    Ok(())
}

pub fn cmd_backup(store_path: &Path) -> Result<()> {
    let backup = create_backup(store_path)?;
    println!("Created backup: {}", backup.display());
    Ok(())
}

pub fn cmd_completions(shell: Shell) {
    use crate::cli::Cli;
    use clap::CommandFactory;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

pub fn cmd_ui(manager: TaskManager, store: Box<dyn TaskStore>) -> Result<()> {
    crate::tui::app::run_tui(manager, store).context("terminal UI failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{Priority, Status};
    use crate::store::JsonStore;

    fn setup() -> (tempfile::TempDir, PathBuf, TaskManager) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        (dir, path, TaskManager::new())
    }

    fn reload(path: &Path) -> TaskManager {
        TaskManager::from_store(&mut JsonStore::new(path)).unwrap().0
    }

    #[test]
    fn test_add_saves_each_kind() {
        let (_dir, path, mut m) = setup();
        let mut store = JsonStore::new(&path);
        cmd_add(&mut m, &mut store, "Milk".into(), "2024-01-01".into(), None, Kind::General, None, vec![]).unwrap();
        cmd_add(&mut m, &mut store, "Gym".into(), "2024-01-02".into(), None, Kind::Personal, None, vec![]).unwrap();
        cmd_add(
            &mut m,
            &mut store,
            "Ship".into(),
            "2024-01-03".into(),
            Some("v2".into()),
            Kind::Work,
            None,
            vec!["Ann".into()],
        )
        .unwrap();

        let loaded = reload(&path);
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.get(2).unwrap().priority(), Some(Priority::Low));
        assert_eq!(loaded.get(3).unwrap().team_members(), ["Ann"]);
    }

    #[test]
    fn test_add_rejects_options_for_other_kinds() {
        let (_dir, path, mut m) = setup();
        let mut store = JsonStore::new(&path);
        let res = cmd_add(
            &mut m,
            &mut store,
            "Milk".into(),
            "2024-01-01".into(),
            None,
            Kind::General,
            Some("high".into()),
            vec![],
        );
        assert!(res.is_err());
        let res = cmd_add(
            &mut m,
            &mut store,
            "Gym".into(),
            "2024-01-01".into(),
            None,
            Kind::Personal,
            None,
            vec!["Ann".into()],
        );
        assert!(res.is_err());
        assert!(m.is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn test_validation_failure_does_not_touch_store() {
        let (_dir, path, mut m) = setup();
        let mut store = JsonStore::new(&path);
        let res = cmd_add(
            &mut m,
            &mut store,
            "Milk".into(),
            "01/02/2024".into(),
            None,
            Kind::General,
            None,
            vec![],
        );
        assert!(res.is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_mutating_commands_persist() {
        let (_dir, path, mut m) = setup();
        let mut store = JsonStore::new(&path);
        m.create_personal("Gym", "2024-01-01", "low", None).unwrap();
        m.create_work("Ship", "2024-01-01", None, &[]).unwrap();

        cmd_complete(&mut m, &mut store, 1).unwrap();
        cmd_describe(&mut m, &mut store, 1, "legs".into()).unwrap();
        cmd_priority(&mut m, &mut store, 1, "HIGH".into()).unwrap();
        cmd_member(&mut m, &mut store, 2, " Bob ".into()).unwrap();

        let loaded = reload(&path);
        let gym = loaded.get(1).unwrap();
        assert_eq!(gym.status(), Status::Completed);
        assert_eq!(gym.description(), "legs");
        assert_eq!(gym.priority(), Some(Priority::High));
        assert_eq!(loaded.get(2).unwrap().team_members(), ["Bob"]);
    }

    #[test]
    fn test_wrong_kind_and_missing_id_are_errors() {
        let (_dir, path, mut m) = setup();
        let mut store = JsonStore::new(&path);
        m.create_general("Milk", "2024-01-01", None).unwrap();
        assert!(cmd_priority(&mut m, &mut store, 1, "high".into()).is_err());
        assert!(cmd_member(&mut m, &mut store, 1, "Ann".into()).is_err());
        assert!(cmd_complete(&mut m, &mut store, 9).is_err());
        assert!(cmd_view(&m, 9).is_err());
    }

    #[test]
    fn test_delete_missing_is_not_an_error() {
        let (_dir, path, mut m) = setup();
        let mut store = JsonStore::new(&path);
        m.create_general("Milk", "2024-01-01", None).unwrap();
        cmd_delete(&mut m, &mut store, 5).unwrap();
        assert_eq!(m.len(), 1);
        cmd_delete(&mut m, &mut store, 1).unwrap();
        assert!(reload(&path).is_empty());
    }

    #[test]
    fn test_overdue_rejects_bad_date() {
        let (_dir, _path, m) = setup();
        assert!(cmd_overdue(&m, Some("tomorrow".into())).is_err());
        cmd_overdue(&m, Some("2024-01-01".into())).unwrap();
    }

    #[test]
    fn test_export_then_import() {
        let (dir, path, mut m) = setup();
        let mut store = JsonStore::new(&path);
        m.create_general("Milk", "2024-01-01", None).unwrap();
        m.create_work("Ship", "2024-01-01", None, &["Ann".into()]).unwrap();
        m.save_all(&mut store).unwrap();

        let csv = dir.path().join("out.csv");
        cmd_export(&m, csv.clone(), None).unwrap();
        assert!(csv.exists());

        let mut other = TaskManager::new();
        other.create_general("Old", "2023-01-01", None).unwrap();
        cmd_import(&mut other, &mut store, &path, csv, None, false).unwrap();
        assert_eq!(other.len(), 2);
        assert!(dir.path().join("backup").read_dir().unwrap().next().is_some());

        let loaded = reload(&path);
        assert_eq!(loaded.get(2).unwrap().team_members(), ["Ann"]);
    }

    #[test]
    fn test_export_needs_a_known_format() {
        let (dir, _path, m) = setup();
        assert!(cmd_export(&m, dir.path().join("out.txt"), None).is_err());
        cmd_export(&m, dir.path().join("out.txt"), Some(StoreFormat::Json)).unwrap();
    }

    #[test]
    fn test_import_missing_source_is_an_error() {
        let (dir, path, mut m) = setup();
        let mut store = JsonStore::new(&path);
        let res = cmd_import(&mut m, &mut store, &path, dir.path().join("nope.json"), None, true);
        assert!(res.is_err());
    }
}
