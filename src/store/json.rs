//! JSON file store.
//!
//! The file holds a single object with a `tasks` array. Each element is decoded
//! on its own so one damaged entry does not hide the rest.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StoreError;
use crate::record::{RecordRow, SkippedRecord, TaskRecord};
use crate::store::{missing, TaskStore};

#[derive(Serialize)]
struct StoreFile<'a> {
    tasks: &'a [TaskRecord],
}

#[derive(Deserialize)]
struct RawStoreFile {
    #[serde(default)]
    tasks: Vec<serde_json::Value>,
}

pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: &Path) -> Self {
        JsonStore {
            path: path.to_path_buf(),
        }
    }
}

impl TaskStore for JsonStore {
    fn describe(&self) -> String {
        format!("JSON file {}", self.path.display())
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Atomic-ish write via temp file + rename.
    fn write_all(&mut self, records: &[TaskRecord]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let data = serde_json::to_string_pretty(&StoreFile { tasks: records })?;
        let mut f = File::create(&tmp).map_err(|e| StoreError::io(&tmp, e))?;
        f.write_all(data.as_bytes())
            .and_then(|_| f.flush())
            .map_err(|e| StoreError::io(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| StoreError::io(&self.path, e))?;
        debug!(path = %self.path.display(), count = records.len(), "wrote JSON store");
        Ok(())
    }

    fn read_all(&mut self) -> Result<Vec<RecordRow>, StoreError> {
        if missing(&self.path) {
            return Ok(Vec::new());
        }
        let buf = fs::read_to_string(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        if buf.trim().is_empty() {
            return Ok(Vec::new());
        }
        let raw: RawStoreFile = serde_json::from_str(&buf).map_err(|e| StoreError::Malformed {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        Ok(raw
            .tasks
            .into_iter()
            .enumerate()
            .map(|(position, value)| {
                let id = value.get("id").and_then(serde_json::Value::as_u64);
                serde_json::from_value::<TaskRecord>(value).map_err(|e| SkippedRecord {
                    position,
                    id,
                    reason: format!("undecodable record: {e}"),
                })
            })
            .collect())
    }
}
