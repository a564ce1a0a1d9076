//! Enumerations and field types for task tracking.
//!
//! This module defines the small closed vocabularies a task is built from:
//! its kind, completion status, personal priority, and the storage format
//! used to persist the collection.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Discriminator identifying which variant a task is.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    General,
    Personal,
    Work,
}

impl Kind {
    pub const ALL: [Kind; 3] = [Kind::General, Kind::Personal, Kind::Work];

    pub fn as_str(self) -> &'static str {
        match self {
            Kind::General => "general",
            Kind::Personal => "personal",
            Kind::Work => "work",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "general" => Ok(Kind::General),
            "personal" => Ok(Kind::Personal),
            "work" => Ok(Kind::Work),
            _ => Err(ValidationError::InvalidKind(s.to_string())),
        }
    }
}

/// Task completion status. The only transition is pending -> completed.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Pending,
    Completed,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Completed => "completed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Status::Pending),
            "completed" => Ok(Status::Completed),
            _ => Err(ValidationError::InvalidStatus(s.to_string())),
        }
    }
}

/// Priority of a personal task.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(ValidationError::InvalidPriority(s.to_string())),
        }
    }
}

/// Physical format of a task store.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreFormat {
    #[default]
    Json,
    Csv,
    Sqlite,
}

impl StoreFormat {
    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "json" => Some(StoreFormat::Json),
            "csv" => Some(StoreFormat::Csv),
            "db" | "sqlite" | "sqlite3" => Some(StoreFormat::Sqlite),
            _ => None,
        }
    }

    /// Default file name used inside the data directory.
    pub fn default_file_name(self) -> &'static str {
        match self {
            StoreFormat::Json => "tasks.json",
            StoreFormat::Csv => "task_list.csv",
            StoreFormat::Sqlite => "tasks.db",
        }
    }
}

impl fmt::Display for StoreFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            StoreFormat::Json => "json",
            StoreFormat::Csv => "csv",
            StoreFormat::Sqlite => "sqlite",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_priority() {
        assert_eq!("high".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!(" Medium ".parse::<Priority>().unwrap(), Priority::Medium);
        assert_eq!(
            "urgent".parse::<Priority>(),
            Err(ValidationError::InvalidPriority("urgent".into()))
        );
    }

    #[test]
    fn test_parse_kind_and_status() {
        assert_eq!("work".parse::<Kind>().unwrap(), Kind::Work);
        assert!("chore".parse::<Kind>().is_err());
        assert_eq!("completed".parse::<Status>().unwrap(), Status::Completed);
        assert!("done".parse::<Status>().is_err());
    }

    #[test]
    fn test_store_format_from_path() {
        assert_eq!(StoreFormat::from_path(Path::new("a/tasks.json")), Some(StoreFormat::Json));
        assert_eq!(StoreFormat::from_path(Path::new("task_list.CSV")), Some(StoreFormat::Csv));
        assert_eq!(StoreFormat::from_path(Path::new("tasks.db")), Some(StoreFormat::Sqlite));
        assert_eq!(StoreFormat::from_path(Path::new("tasks")), None);
    }

    #[test]
    fn test_display_honours_width() {
        assert_eq!(format!("{:<9}|", Kind::Work), "work     |");
        assert_eq!(format!("{:>7}", Status::Pending), "pending");
        assert_eq!(format!("{:<6}|", Priority::Low), "low   |");
    }
}
