//! Flat persistence shape shared by every store.
//!
//! A `TaskRecord` carries a task's fields as plain strings so that a store can
//! hand back whatever it read; validation happens when the record is turned
//! back into a `Task`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::fields::{Kind, Priority, Status};
use crate::task::{Task, TaskDetails, DUE_DATE_FORMAT};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: u64,
    pub title: String,
    pub due_date: String,
    pub status: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_flag")]
    pub flag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub team_members: Vec<String>,
}

fn default_flag() -> String {
    Kind::General.as_str().to_string()
}

/// A stored record that was left out of a load, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    /// Zero-based position of the record in the store.
    pub position: usize,
    pub id: Option<u64>,
    pub reason: String,
}

impl fmt::Display for SkippedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "record {} (id {}): {}", self.position + 1, id, self.reason),
            None => write!(f, "record {}: {}", self.position + 1, self.reason),
        }
    }
}

/// One row as read from a store: either a decoded record or the reason it
/// could not be decoded.
pub type RecordRow = Result<TaskRecord, SkippedRecord>;

impl From<&Task> for TaskRecord {
    fn from(task: &Task) -> Self {
        TaskRecord {
            id: task.id(),
            title: task.title().to_string(),
            due_date: task.due_date().format(DUE_DATE_FORMAT).to_string(),
            status: task.status().as_str().to_string(),
            description: task.description().to_string(),
            flag: task.kind().as_str().to_string(),
            priority: task.priority().map(|p| p.as_str().to_string()),
            team_members: task.team_members().to_vec(),
        }
    }
}

impl TryFrom<TaskRecord> for Task {
    type Error = ValidationError;

    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        let status: Status = record.status.parse()?;
        let details = match record.flag.parse::<Kind>()? {
            Kind::General => TaskDetails::General,
            Kind::Personal => TaskDetails::Personal {
                priority: match record.priority.as_deref() {
                    None | Some("") => Priority::default(),
                    Some(p) => p.parse()?,
                },
            },
            Kind::Work => TaskDetails::Work {
                team_members: record.team_members,
            },
        };
        Task::restore(
            record.id,
            &record.title,
            &record.due_date,
            &record.description,
            status,
            details,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::IdAllocator;

    fn record(flag: &str) -> TaskRecord {
        TaskRecord {
            id: 3,
            title: "Plan trip".into(),
            due_date: "2024-08-01".into(),
            status: "pending".into(),
            description: String::new(),
            flag: flag.into(),
            priority: None,
            team_members: Vec::new(),
        }
    }

    #[test]
    fn test_task_to_record_and_back() {
        let mut ids = IdAllocator::new();
        let mut task = Task::work(&mut ids, "Report", "2024-03-09", Some("Q1")).unwrap();
        task.add_team_member("Alice").unwrap();
        task.mark_completed();

        let rec = TaskRecord::from(&task);
        assert_eq!(rec.flag, "work");
        assert_eq!(rec.status, "completed");
        assert_eq!(rec.priority, None);

        let back = Task::try_from(rec).unwrap();
        assert_eq!(back, task);
    }

    #[test]
    fn test_personal_record_without_priority_defaults_to_low() {
        let task = Task::try_from(record("personal")).unwrap();
        assert_eq!(task.priority(), Some(Priority::Low));
    }

    #[test]
    fn test_invalid_records_rejected() {
        let mut bad = record("chore");
        assert_eq!(
            Task::try_from(bad.clone()),
            Err(ValidationError::InvalidKind("chore".into()))
        );

        bad = record("general");
        bad.status = "done".into();
        assert!(matches!(Task::try_from(bad), Err(ValidationError::InvalidStatus(_))));

        bad = record("general");
        bad.title = String::new();
        assert_eq!(Task::try_from(bad), Err(ValidationError::EmptyTitle));

        bad = record("personal");
        bad.priority = Some("urgent".into());
        assert!(matches!(Task::try_from(bad), Err(ValidationError::InvalidPriority(_))));
    }

    #[test]
    fn test_json_defaults_for_missing_fields() {
        let rec: TaskRecord = serde_json::from_str(
            r#"{"id": 1, "title": "t", "due_date": "2024-01-01", "status": "pending"}"#,
        )
        .unwrap();
        assert_eq!(rec.flag, "general");
        assert_eq!(rec.description, "");
        assert!(rec.team_members.is_empty());
    }

    #[test]
    fn test_skipped_record_display() {
        let skipped = SkippedRecord {
            position: 0,
            id: Some(9),
            reason: "title must be a non-empty string".into(),
        };
        assert_eq!(skipped.to_string(), "record 1 (id 9): title must be a non-empty string");
    }
}
