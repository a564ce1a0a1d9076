//! SQLite store.
//!
//! The `tasks` table keeps the column layout of the original tracker database
//! (`id, type, title, due_date, description, priority, status`). Two additions
//! are migrated in on open: a `position` column that preserves collection order
//! and a `team_members` table for work tasks.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, Row};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::record::{RecordRow, SkippedRecord, TaskRecord};
use crate::store::{missing, TaskStore};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS tasks (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        type TEXT NOT NULL,
        title TEXT NOT NULL,
        due_date TEXT NOT NULL,
        description TEXT,
        priority TEXT,
        status TEXT DEFAULT 'pending'
    );

    CREATE TABLE IF NOT EXISTS team_members (
        task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
        position INTEGER NOT NULL,
        name TEXT NOT NULL,
        PRIMARY KEY (task_id, position)
    );
"#;

const SELECT_TASKS: &str = "SELECT id, type, title, due_date, description, priority, status
    FROM tasks ORDER BY position, id";
const SELECT_MEMBERS: &str = "SELECT task_id, name FROM team_members ORDER BY task_id, position";
const INSERT_TASK: &str = "INSERT INTO tasks (id, type, title, due_date, description, priority, status, position)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";
const INSERT_MEMBER: &str = "INSERT INTO team_members (task_id, position, name) VALUES (?1, ?2, ?3)";

pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    pub fn new(path: &Path) -> Self {
        SqliteStore {
            path: path.to_path_buf(),
        }
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        let conn = Connection::open(&self.path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        migrate_position_column(&conn)?;
        Ok(conn)
    }
}

/// Databases created by the original tracker have no `position` column.
fn migrate_position_column(conn: &Connection) -> Result<(), StoreError> {
    let mut stmt = conn.prepare("PRAGMA table_info(tasks)")?;
    let has_position = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?
        .iter()
        .any(|name| name == "position");
    if !has_position {
        info!("adding position column to tasks table");
        conn.execute(
            "ALTER TABLE tasks ADD COLUMN position INTEGER NOT NULL DEFAULT 0",
            [],
        )?;
    }
    Ok(())
}

fn decode_task(position: usize, row: &Row<'_>) -> RecordRow {
    let id: Option<i64> = row.get(0).ok();
    let skip = |reason: String| SkippedRecord {
        position,
        id: id.and_then(|i| u64::try_from(i).ok()),
        reason,
    };
    let id = id
        .and_then(|i| u64::try_from(i).ok())
        .ok_or_else(|| skip("invalid task id".to_string()))?;
    let text = |idx: usize| -> Result<String, SkippedRecord> {
        row.get::<_, Option<String>>(idx)
            .map(Option::unwrap_or_default)
            .map_err(|e| skip(format!("undecodable column {idx}: {e}")))
    };

    let priority = text(5)?;
    let status = text(6)?;
    Ok(TaskRecord {
        id,
        flag: text(1)?,
        title: text(2)?,
        due_date: text(3)?,
        description: text(4)?,
        priority: (!priority.is_empty()).then_some(priority),
        status: if status.is_empty() { "pending".to_string() } else { status },
        team_members: Vec::new(),
    })
}

impl TaskStore for SqliteStore {
    fn describe(&self) -> String {
        format!("SQLite database {}", self.path.display())
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn write_all(&mut self, records: &[TaskRecord]) -> Result<(), StoreError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM team_members", [])?;
        tx.execute("DELETE FROM tasks", [])?;
        {
            let mut insert_task = tx.prepare(INSERT_TASK)?;
            let mut insert_member = tx.prepare(INSERT_MEMBER)?;
            for (position, record) in records.iter().enumerate() {
                let id = i64::try_from(record.id).map_err(|_| StoreError::Malformed {
                    path: self.path.clone(),
                    message: format!("task id {} does not fit in SQLite", record.id),
                })?;
                insert_task.execute(params![
                    id,
                    record.flag,
                    record.title,
                    record.due_date,
                    record.description,
                    record.priority,
                    record.status,
                    position as i64,
                ])?;
                for (member_pos, name) in record.team_members.iter().enumerate() {
                    insert_member.execute(params![id, member_pos as i64, name])?;
                }
            }
        }
        tx.commit()?;
        debug!(path = %self.path.display(), count = records.len(), "wrote SQLite store");
        Ok(())
    }

    fn read_all(&mut self) -> Result<Vec<RecordRow>, StoreError> {
        if missing(&self.path) {
            return Ok(Vec::new());
        }
        let conn = self.connect()?;

        let mut members: HashMap<i64, Vec<String>> = HashMap::new();
        {
            let mut stmt = conn.prepare(SELECT_MEMBERS)?;
            let rows = stmt.query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?;
            for row in rows {
                let (task_id, name) = row?;
                members.entry(task_id).or_default().push(name);
            }
        }

        let mut stmt = conn.prepare(SELECT_TASKS)?;
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut decoded = decode_task(out.len(), row);
            if let Ok(record) = decoded.as_mut() {
                if let Some(names) = i64::try_from(record.id).ok().and_then(|id| members.remove(&id)) {
                    record.team_members = names;
                }
            }
            out.push(decoded);
        }
        Ok(out)
    }
}
