//! Persistence collaborators for the task manager.
//!
//! A store only moves `TaskRecord`s in and out of a backing resource. It never
//! validates tasks; that is the manager's job when it loads. A missing backing
//! resource always reads as an empty store.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::info;

use crate::error::StoreError;
use crate::fields::StoreFormat;
use crate::record::{RecordRow, TaskRecord};

pub mod csv;
pub mod json;
pub mod sqlite;

pub use self::csv::CsvStore;
pub use self::json::JsonStore;
pub use self::sqlite::SqliteStore;

/// Bulk reader/writer of task records.
pub trait TaskStore {
    /// Human-readable name of the backing resource, for messages.
    fn describe(&self) -> String;

    /// Whether the backing resource exists yet. A missing one reads as empty.
    fn exists(&self) -> bool;

    /// Replace the whole contents of the store with `records`.
    fn write_all(&mut self, records: &[TaskRecord]) -> Result<(), StoreError>;

    /// Read every record. Rows that cannot be decoded come back as
    /// `Err(SkippedRecord)` instead of failing the whole read.
    fn read_all(&mut self) -> Result<Vec<RecordRow>, StoreError>;
}

/// Open a store of the given format at `path`.
pub fn open_store(format: StoreFormat, path: &Path) -> Box<dyn TaskStore> {
    match format {
        StoreFormat::Json => Box::new(JsonStore::new(path)),
        StoreFormat::Csv => Box::new(CsvStore::new(path)),
        StoreFormat::Sqlite => Box::new(SqliteStore::new(path)),
    }
}

/// Shared "nothing there yet" handling for file-backed stores.
pub(crate) fn missing(path: &Path) -> bool {
    if path.exists() {
        return false;
    }
    info!(path = %path.display(), "no task store found, starting with an empty list");
    true
}

/// Create a timestamped copy of a store file in a `backup/` directory next to it.
pub fn create_backup(store_path: &Path) -> Result<PathBuf, StoreError> {
    if !store_path.exists() {
        return Err(StoreError::io(
            store_path,
            std::io::Error::new(std::io::ErrorKind::NotFound, "store file does not exist"),
        ));
    }

    let parent_dir = store_path.parent().unwrap_or_else(|| Path::new("."));
    let backup_dir = parent_dir.join("backup");
    fs::create_dir_all(&backup_dir).map_err(|e| StoreError::io(&backup_dir, e))?;

    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    let file_name = store_path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("tasks");
    let backup_path = backup_dir.join(format!("{timestamp}_{file_name}"));

    fs::copy(store_path, &backup_path).map_err(|e| StoreError::io(&backup_path, e))?;
    info!(backup = %backup_path.display(), "created backup");
    Ok(backup_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<TaskRecord> {
        vec![
            TaskRecord {
                id: 1,
                title: "Buy milk".into(),
                due_date: "2024-01-01".into(),
                status: "pending".into(),
                description: "2, \"fresh\"".into(),
                flag: "general".into(),
                priority: None,
                team_members: Vec::new(),
            },
            TaskRecord {
                id: 2,
                title: "Gym".into(),
                due_date: "2024-02-01".into(),
                status: "completed".into(),
                description: String::new(),
                flag: "personal".into(),
                priority: Some("high".into()),
                team_members: Vec::new(),
            },
            TaskRecord {
                id: 5,
                title: "Report".into(),
                due_date: "2024-03-01".into(),
                status: "pending".into(),
                description: "Q1".into(),
                flag: "work".into(),
                priority: None,
                team_members: vec!["Alice".into(), "Bob".into()],
            },
        ]
    }

    #[test]
    fn test_every_format_reads_back_what_it_wrote() {
        let dir = tempfile::tempdir().unwrap();
        for format in [StoreFormat::Json, StoreFormat::Csv, StoreFormat::Sqlite] {
            let path = dir.path().join(format.default_file_name());
            let mut store = open_store(format, &path);
            store.write_all(&sample()).unwrap();

            let rows: Vec<TaskRecord> = store
                .read_all()
                .unwrap()
                .into_iter()
                .collect::<Result<_, _>>()
                .unwrap();
            assert_eq!(rows, sample(), "{format} store");
        }
    }

    #[test]
    fn test_missing_resource_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        for format in [StoreFormat::Json, StoreFormat::Csv, StoreFormat::Sqlite] {
            let path = dir.path().join("absent").join(format.default_file_name());
            let mut store = open_store(format, &path);
            assert!(!store.exists(), "{format} store");
            assert!(store.read_all().unwrap().is_empty(), "{format} store");
            store.write_all(&sample()).unwrap();
            assert!(store.exists(), "{format} store");
        }
    }

    #[test]
    fn test_write_all_replaces_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        for format in [StoreFormat::Json, StoreFormat::Csv, StoreFormat::Sqlite] {
            let path = dir.path().join(format.default_file_name());
            let mut store = open_store(format, &path);
            store.write_all(&sample()).unwrap();
            store.write_all(&sample()[..1]).unwrap();
            assert_eq!(store.read_all().unwrap().len(), 1, "{format} store");
        }
    }

    #[test]
    fn test_create_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        assert!(create_backup(&path).is_err());

        fs::write(&path, "[]").unwrap();
        let backup = create_backup(&path).unwrap();
        assert!(backup.starts_with(dir.path().join("backup")));
        assert_eq!(fs::read_to_string(backup).unwrap(), "[]");
    }
}
