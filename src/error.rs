//! Error types for the task tracker.
//!
//! Validation failures are raised where the violation happens and never reach
//! the manager. Lookup misses are plain `NotFound` values. Store errors cover
//! real I/O failures only; a missing backing file is not an error.

use std::path::PathBuf;

use thiserror::Error;

use crate::fields::Kind;

/// Maximum number of characters a task description may hold.
pub const MAX_DESCRIPTION_LEN: usize = 15;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("title must be a non-empty string")]
    EmptyTitle,

    #[error("due date '{0}' must be a real date in the format YYYY-MM-DD")]
    MalformedDueDate(String),

    #[error("description cannot exceed {MAX_DESCRIPTION_LEN} characters (got {len})")]
    DescriptionTooLong { len: usize },

    #[error("invalid priority '{0}', choose 'low', 'medium' or 'high'")]
    InvalidPriority(String),

    #[error("team member name must be a non-empty string")]
    EmptyMemberName,

    #[error("operation needs a {expected} task but task is {found}")]
    WrongKind { expected: Kind, found: Kind },

    #[error("invalid status '{0}', expected 'pending' or 'completed'")]
    InvalidStatus(String),

    #[error("invalid task kind '{0}', expected 'general', 'personal' or 'work'")]
    InvalidKind(String),
}

/// A lookup or delete did not match any task.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("task {0} not found")]
pub struct NotFound(pub u64);

/// A task was added under an id the manager already holds.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("task id {0} is already in use")]
pub struct DuplicateId(pub u64);

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("malformed store {path}: {message}")]
    Malformed { path: PathBuf, message: String },
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
