//! Task data structure and related functionality.
//!
//! A `Task` is only ever built through one of the validating constructors, so
//! every value of the type satisfies the title, due date, and description rules.
//! Variant-specific data lives in `TaskDetails`, a sum type whose tag doubles
//! as the task kind.

use std::fmt;

use chrono::NaiveDate;

use crate::error::{ValidationError, MAX_DESCRIPTION_LEN};
use crate::fields::{Kind, Priority, Status};
use crate::ids::IdAllocator;

/// Canonical textual format of a due date.
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Variant-specific task data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskDetails {
    General,
    Personal { priority: Priority },
    Work { team_members: Vec<String> },
}

impl TaskDetails {
    pub fn kind(&self) -> Kind {
        match self {
            TaskDetails::General => Kind::General,
            TaskDetails::Personal { .. } => Kind::Personal,
            TaskDetails::Work { .. } => Kind::Work,
        }
    }
}

/// One unit of trackable work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    id: u64,
    title: String,
    due_date: NaiveDate,
    description: String,
    status: Status,
    details: TaskDetails,
}

/// Parse a due date written exactly as `YYYY-MM-DD`.
///
/// chrono alone would accept `2024-1-5`, so the shape is checked first.
pub fn parse_due_date(s: &str) -> Result<NaiveDate, ValidationError> {
    let malformed = || ValidationError::MalformedDueDate(s.to_string());
    let bytes = s.as_bytes();
    if bytes.len() != 10 {
        return Err(malformed());
    }
    let shape_ok = bytes.iter().enumerate().all(|(i, b)| match i {
        4 | 7 => *b == b'-',
        _ => b.is_ascii_digit(),
    });
    if !shape_ok {
        return Err(malformed());
    }
    NaiveDate::parse_from_str(s, DUE_DATE_FORMAT).map_err(|_| malformed())
}

fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), ValidationError> {
    let len = description.chars().count();
    if len > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::DescriptionTooLong { len });
    }
    Ok(())
}

fn validate_member(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyMemberName);
    }
    Ok(name.to_string())
}

impl Task {
    /// Create a general task.
    pub fn general(
        ids: &mut IdAllocator,
        title: &str,
        due_date: &str,
        description: Option<&str>,
    ) -> Result<Self, ValidationError> {
        Self::build(ids, title, due_date, description, || Ok(TaskDetails::General))
    }

    /// Create a personal task. `priority` must be one of low, medium, high.
    pub fn personal(
        ids: &mut IdAllocator,
        title: &str,
        due_date: &str,
        priority: &str,
        description: Option<&str>,
    ) -> Result<Self, ValidationError> {
        Self::build(ids, title, due_date, description, || {
            Ok(TaskDetails::Personal {
                priority: priority.parse()?,
            })
        })
    }

    /// Create a work task with no team members yet.
    pub fn work(
        ids: &mut IdAllocator,
        title: &str,
        due_date: &str,
        description: Option<&str>,
    ) -> Result<Self, ValidationError> {
        Self::build(ids, title, due_date, description, || {
            Ok(TaskDetails::Work {
                team_members: Vec::new(),
            })
        })
    }

    /// Checks run title, due date, description, then variant fields. An id is
    /// only taken once every check has passed.
    fn build(
        ids: &mut IdAllocator,
        title: &str,
        due_date: &str,
        description: Option<&str>,
        details: impl FnOnce() -> Result<TaskDetails, ValidationError>,
    ) -> Result<Self, ValidationError> {
        validate_title(title)?;
        let due_date = parse_due_date(due_date)?;
        let description = description.unwrap_or_default();
        validate_description(description)?;
        let details = details()?;

        Ok(Task {
            id: ids.allocate(),
            title: title.to_string(),
            due_date,
            description: description.to_string(),
            status: Status::Pending,
            details,
        })
    }

    /// Rebuild a task that already has an id, e.g. one read back from a store.
    /// Applies the same validation as the constructors.
    pub fn restore(
        id: u64,
        title: &str,
        due_date: &str,
        description: &str,
        status: Status,
        details: TaskDetails,
    ) -> Result<Self, ValidationError> {
        validate_title(title)?;
        let due_date = parse_due_date(due_date)?;
        validate_description(description)?;
        let details = match details {
            TaskDetails::Work { team_members } => TaskDetails::Work {
                team_members: team_members
                    .iter()
                    .map(|m| validate_member(m))
                    .collect::<Result<_, _>>()?,
            },
            other => other,
        };

        Ok(Task {
            id,
            title: title.to_string(),
            due_date,
            description: description.to_string(),
            status,
            details,
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn kind(&self) -> Kind {
        self.details.kind()
    }

    pub fn details(&self) -> &TaskDetails {
        &self.details
    }

    pub fn is_pending(&self) -> bool {
        self.status == Status::Pending
    }

    /// Due strictly before `as_of`.
    pub fn is_overdue(&self, as_of: NaiveDate) -> bool {
        self.due_date < as_of
    }

    /// Move the task to `completed`. Completing a completed task does nothing.
    pub fn mark_completed(&mut self) {
        self.status = Status::Completed;
    }

    /// Replace the description, keeping the old one if the new text is too long.
    pub fn set_description(&mut self, description: &str) -> Result<(), ValidationError> {
        validate_description(description)?;
        self.description = description.to_string();
        Ok(())
    }

    /// Priority of a personal task, `None` for other kinds.
    pub fn priority(&self) -> Option<Priority> {
        match self.details {
            TaskDetails::Personal { priority } => Some(priority),
            _ => None,
        }
    }

    pub fn is_high_priority(&self) -> bool {
        self.priority() == Some(Priority::High)
    }

    /// Change the priority of a personal task. An unknown level is rejected and
    /// the current priority is kept.
    pub fn set_priority(&mut self, priority: &str) -> Result<(), ValidationError> {
        let found = self.kind();
        match &mut self.details {
            TaskDetails::Personal { priority: current } => {
                *current = priority.parse()?;
                Ok(())
            }
            _ => Err(ValidationError::WrongKind {
                expected: Kind::Personal,
                found,
            }),
        }
    }

    /// Team members of a work task in the order they were added.
    pub fn team_members(&self) -> &[String] {
        match &self.details {
            TaskDetails::Work { team_members } => team_members,
            _ => &[],
        }
    }

    /// Append a member to a work task.
    pub fn add_team_member(&mut self, name: &str) -> Result<(), ValidationError> {
        let found = self.kind();
        match &mut self.details {
            TaskDetails::Work { team_members } => {
                team_members.push(validate_member(name)?);
                Ok(())
            }
            _ => Err(ValidationError::WrongKind {
                expected: Kind::Work,
                found,
            }),
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID: {}, Title: {}, Due: {}, Status: {}, Description: {}",
            self.id,
            self.title,
            self.due_date.format(DUE_DATE_FORMAT),
            self.status,
            self.description
        )?;
        match &self.details {
            TaskDetails::General => Ok(()),
            TaskDetails::Personal { priority } => write!(f, ", Priority: {priority}"),
            TaskDetails::Work { team_members } if team_members.is_empty() => {
                write!(f, ", Team Members: None")
            }
            TaskDetails::Work { team_members } => {
                write!(f, ", Team Members: {}", team_members.join(", "))
            }
        }
    }
}
