//! CSV file store.
//!
//! Columns are located by header name, so files that only carry the six core
//! columns (`task_id,title,due_date,status,description,flag`) still load.
//! Team members share one column, separated by `;`. A `;` or `\` inside a
//! name is written with a leading backslash.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::StoreError;
use crate::record::{RecordRow, SkippedRecord, TaskRecord};
use crate::store::{missing, TaskStore};

pub const HEADER: [&str; 8] = [
    "task_id",
    "title",
    "due_date",
    "status",
    "description",
    "flag",
    "priority",
    "team_members",
];

const MEMBER_SEPARATOR: char = ';';

pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: &Path) -> Self {
        CsvStore {
            path: path.to_path_buf(),
        }
    }
}

/// Quote a field if it contains a separator, quote, or line break.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Join team member names into one field, escaping the separator.
fn join_members(members: &[String]) -> String {
    members
        .iter()
        .map(|name| {
            name.replace('\\', "\\\\")
                .replace(MEMBER_SEPARATOR, "\\;")
        })
        .collect::<Vec<_>>()
        .join(&MEMBER_SEPARATOR.to_string())
}

/// Inverse of `join_members`. Blank entries are dropped.
fn split_members(field: &str) -> Vec<String> {
    let mut members = Vec::new();
    let mut current = String::new();
    let mut chars = field.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => current.push(chars.next().unwrap_or('\\')),
            MEMBER_SEPARATOR => members.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    members.push(current);
    members
        .into_iter()
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .collect()
}

/// Split CSV text into records, honouring quoted fields that span lines.
fn parse_csv(content: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut current_field = String::new();
    let mut in_quotes = false;
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current_field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current_field)),
            '\r' if !in_quotes => {}
            '\n' if !in_quotes => {
                fields.push(std::mem::take(&mut current_field));
                records.push(std::mem::take(&mut fields));
            }
            _ => current_field.push(ch),
        }
    }
    if !current_field.is_empty() || !fields.is_empty() {
        fields.push(current_field);
        records.push(fields);
    }

    // Blank lines come through as a single empty field.
    records.retain(|r| !(r.len() == 1 && r[0].is_empty()));
    records
}

/// Column positions resolved from the header row.
struct Columns {
    width: usize,
    id: usize,
    title: usize,
    due_date: usize,
    status: usize,
    description: Option<usize>,
    flag: Option<usize>,
    priority: Option<usize>,
    team_members: Option<usize>,
}

impl Columns {
    fn from_header(header: &[String]) -> Result<Self, String> {
        let find = |name: &str| header.iter().position(|h| h.trim() == name);
        let require = |name: &str| find(name).ok_or_else(|| format!("missing column '{name}'"));
        Ok(Columns {
            width: header.len(),
            id: require("task_id")?,
            title: require("title")?,
            due_date: require("due_date")?,
            status: require("status")?,
            description: find("description"),
            flag: find("flag"),
            priority: find("priority"),
            team_members: find("team_members"),
        })
    }

    fn decode(&self, position: usize, fields: Vec<String>) -> RecordRow {
        let skip = |id: Option<u64>, reason: String| SkippedRecord { position, id, reason };

        if fields.len() != self.width {
            return Err(skip(
                None,
                format!("has {} fields, expected {}", fields.len(), self.width),
            ));
        }
        let id = fields[self.id]
            .trim()
            .parse::<u64>()
            .map_err(|_| skip(None, format!("invalid task id '{}'", fields[self.id])))?;
        let optional = |col: Option<usize>| col.map(|i| fields[i].clone()).unwrap_or_default();

        let priority = optional(self.priority);
        let flag = optional(self.flag);
        Ok(TaskRecord {
            id,
            title: fields[self.title].clone(),
            due_date: fields[self.due_date].clone(),
            status: fields[self.status].clone(),
            description: optional(self.description),
            flag: if flag.is_empty() { "general".to_string() } else { flag },
            priority: (!priority.is_empty()).then_some(priority),
            team_members: split_members(&optional(self.team_members)),
        })
    }
}

impl TaskStore for CsvStore {
    fn describe(&self) -> String {
        format!("CSV file {}", self.path.display())
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn write_all(&mut self, records: &[TaskRecord]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }

        let mut csv_content = HEADER.join(",");
        csv_content.push('\n');
        for record in records {
            let members = join_members(&record.team_members);
            let row = [
                record.id.to_string(),
                escape_csv(&record.title),
                escape_csv(&record.due_date),
                escape_csv(&record.status),
                escape_csv(&record.description),
                escape_csv(&record.flag),
                escape_csv(record.priority.as_deref().unwrap_or("")),
                escape_csv(&members),
            ];
            csv_content.push_str(&row.join(","));
            csv_content.push('\n');
        }

        fs::write(&self.path, csv_content).map_err(|e| StoreError::io(&self.path, e))?;
        debug!(path = %self.path.display(), count = records.len(), "wrote CSV store");
        Ok(())
    }

    fn read_all(&mut self) -> Result<Vec<RecordRow>, StoreError> {
        if missing(&self.path) {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        let mut rows = parse_csv(&content).into_iter();

        let Some(header) = rows.next() else {
            return Ok(Vec::new());
        };
        let columns = Columns::from_header(&header).map_err(|message| StoreError::Malformed {
            path: self.path.clone(),
            message,
        })?;

        Ok(rows
            .enumerate()
            .map(|(position, fields)| columns.decode(position, fields))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_quoting() {
        let rows = parse_csv("a,\"b, c\",\"say \"\"hi\"\"\"\r\n\n\"multi\nline\",x\n");
        assert_eq!(
            rows,
            vec![
                vec!["a".to_string(), "b, c".into(), "say \"hi\"".into()],
                vec!["multi\nline".to_string(), "x".into()],
            ]
        );
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("q\"uote"), "\"q\"\"uote\"");
    }

    #[test]
    fn test_member_names_keep_separators() {
        let members = vec!["Smith;Jones".to_string(), "C:\\dir\\".into(), "Ann".into()];
        let field = join_members(&members);
        assert_eq!(field, "Smith\\;Jones;C:\\\\dir\\\\;Ann");
        assert_eq!(split_members(&field), members);
        assert_eq!(split_members("Ann; ;Bob"), ["Ann", "Bob"]);
        assert!(split_members("").is_empty());
    }

    #[test]
    fn test_work_task_with_separator_in_member_survives_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("task_list.csv");
        let record = TaskRecord {
            id: 1,
            title: "W".into(),
            due_date: "2024-01-01".into(),
            status: "pending".into(),
            description: String::new(),
            flag: "work".into(),
            priority: None,
            team_members: vec!["Smith;Jones".into(), "Lee".into()],
        };
        let mut store = CsvStore::new(&path);
        store.write_all(std::slice::from_ref(&record)).unwrap();
        let rows = CsvStore::new(&path).read_all().unwrap();
        assert_eq!(rows[0].as_ref().unwrap(), &record);
    }

    #[test]
    fn test_reads_six_column_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("task_list.csv");
        fs::write(
            &path,
            "task_id,title,due_date,status,description,flag\n\
             1,Buy milk,2024-01-01,pending,,general\n\
             2,Gym,2024-02-01,completed,legs,personal\n",
        )
        .unwrap();

        let rows = CsvStore::new(&path).read_all().unwrap();
        assert_eq!(rows.len(), 2);
        let gym = rows[1].as_ref().unwrap();
        assert_eq!(gym.id, 2);
        assert_eq!(gym.flag, "personal");
        assert_eq!(gym.priority, None);
        assert_eq!(gym.description, "legs");
    }

    #[test]
    fn test_bad_rows_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("task_list.csv");
        fs::write(
            &path,
            "task_id,title,due_date,status,description,flag\n\
             x,Bad id,2024-01-01,pending,,general\n\
             2,Too,few\n\
             3,Fine,2024-01-03,pending,,work\n",
        )
        .unwrap();

        let rows = CsvStore::new(&path).read_all().unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].as_ref().unwrap_err().reason.contains("invalid task id"));
        assert_eq!(rows[1].as_ref().unwrap_err().position, 1);
        assert_eq!(rows[2].as_ref().unwrap().id, 3);
    }

    #[test]
    fn test_missing_required_column_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("task_list.csv");
        fs::write(&path, "id,name\n1,x\n").unwrap();
        assert!(matches!(
            CsvStore::new(&path).read_all(),
            Err(StoreError::Malformed { .. })
        ));
    }
}
