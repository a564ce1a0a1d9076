//! In-memory task collection.
//!
//! `TaskManager` owns the tasks of one store together with the id allocator
//! that numbers them. It bridges the presentation layer and the storage
//! collaborator: tasks are validated before they get here, and the store is
//! only touched through `save_all` and `load_all`.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::error::{DuplicateId, NotFound, StoreError, ValidationError};
use crate::fields::Kind;
use crate::ids::IdAllocator;
use crate::record::{SkippedRecord, TaskRecord};
use crate::store::TaskStore;
use crate::task::Task;

/// Outcome of a best-effort load.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: Vec<SkippedRecord>,
    /// The backing resource did not exist, so the collection starts empty.
    pub store_missing: bool,
}

#[derive(Debug, Default)]
pub struct TaskManager {
    tasks: Vec<Task>,
    ids: IdAllocator,
}

impl TaskManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager and fill it from `store`.
    pub fn from_store(store: &mut dyn TaskStore) -> Result<(Self, LoadReport), StoreError> {
        let mut manager = Self::new();
        let report = manager.load_all(store)?;
        Ok((manager, report))
    }

    /// The id the next created task will get.
    pub fn next_id(&self) -> u64 {
        self.ids.peek()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Append a task built elsewhere. Its id must not be held by any task
    /// already in the collection.
    pub fn add(&mut self, task: Task) -> Result<u64, DuplicateId> {
        if self.get(task.id()).is_some() {
            return Err(DuplicateId(task.id()));
        }
        Ok(self.push(task))
    }

    /// Ids from `self.ids` are always fresh, so no lookup is needed here.
    fn push(&mut self, task: Task) -> u64 {
        let id = task.id();
        self.ids.observe(id);
        self.tasks.push(task);
        id
    }

    pub fn create_general(
        &mut self,
        title: &str,
        due_date: &str,
        description: Option<&str>,
    ) -> Result<u64, ValidationError> {
        let task = Task::general(&mut self.ids, title, due_date, description)?;
        Ok(self.push(task))
    }

    pub fn create_personal(
        &mut self,
        title: &str,
        due_date: &str,
        priority: &str,
        description: Option<&str>,
    ) -> Result<u64, ValidationError> {
        let task = Task::personal(&mut self.ids, title, due_date, priority, description)?;
        Ok(self.push(task))
    }

    /// Create a work task and add `members` in order. Nothing is added if any
    /// member name is invalid.
    pub fn create_work(
        &mut self,
        title: &str,
        due_date: &str,
        description: Option<&str>,
        members: &[String],
    ) -> Result<u64, ValidationError> {
        let mut scratch = self.ids.clone();
        let mut task = Task::work(&mut scratch, title, due_date, description)?;
        for member in members {
            task.add_team_member(member)?;
        }
        self.ids = scratch;
        Ok(self.push(task))
    }

    /// Tasks in insertion order, optionally restricted to one kind.
    pub fn list(&self, kind: Option<Kind>) -> impl Iterator<Item = &Task> + '_ {
        self.tasks
            .iter()
            .filter(move |t| kind.map_or(true, |k| t.kind() == k))
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id() == id)
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id() == id)
    }

    /// Look up a task for mutation, reporting a miss as `NotFound`.
    pub fn require_mut(&mut self, id: u64) -> Result<&mut Task, NotFound> {
        self.get_mut(id).ok_or(NotFound(id))
    }

    /// Remove the first task with `id`. A miss leaves the collection as it was.
    pub fn delete(&mut self, id: u64) -> Result<Task, NotFound> {
        let idx = self
            .tasks
            .iter()
            .position(|t| t.id() == id)
            .ok_or(NotFound(id))?;
        Ok(self.tasks.remove(idx))
    }

    pub fn complete(&mut self, id: u64) -> Result<(), NotFound> {
        self.require_mut(id)?.mark_completed();
        Ok(())
    }

    pub fn pending(&self) -> impl Iterator<Item = &Task> + '_ {
        self.tasks.iter().filter(|t| t.is_pending())
    }

    /// Tasks due strictly before `as_of`, whatever their status.
    pub fn overdue(&self, as_of: NaiveDate) -> impl Iterator<Item = &Task> + '_ {
        self.tasks.iter().filter(move |t| t.is_overdue(as_of))
    }

    /// Write the whole collection to `store`.
    pub fn save_all(&self, store: &mut dyn TaskStore) -> Result<(), StoreError> {
        let records: Vec<TaskRecord> = self.tasks.iter().map(TaskRecord::from).collect();
        store.write_all(&records)?;
        info!(count = records.len(), store = %store.describe(), "saved tasks");
        Ok(())
    }

    /// Replace the collection with the contents of `store`.
    ///
    /// Loading is best effort: records that cannot be decoded, fail task
    /// validation, or repeat an id already loaded are skipped and listed in
    /// the report. Only a failure of the store itself is an error, in which
    /// case the current collection is left untouched.
    pub fn load_all(&mut self, store: &mut dyn TaskStore) -> Result<LoadReport, StoreError> {
        let store_missing = !store.exists();
        let rows = store.read_all()?;

        let mut report = LoadReport {
            store_missing,
            ..LoadReport::default()
        };
        let mut tasks = Vec::with_capacity(rows.len());
        let mut seen = HashSet::new();

        for (position, row) in rows.into_iter().enumerate() {
            let record = match row {
                Ok(record) => record,
                Err(skipped) => {
                    report.skipped.push(skipped);
                    continue;
                }
            };
            let id = record.id;
            if seen.contains(&id) {
                report.skipped.push(SkippedRecord {
                    position,
                    id: Some(id),
                    reason: "duplicate task id".to_string(),
                });
                continue;
            }
            match Task::try_from(record) {
                Ok(task) => {
                    seen.insert(id);
                    tasks.push(task);
                }
                Err(e) => report.skipped.push(SkippedRecord {
                    position,
                    id: Some(id),
                    reason: e.to_string(),
                }),
            }
        }

        for skipped in &report.skipped {
            warn!(store = %store.describe(), "skipping invalid task {skipped}");
        }

        let mut ids = IdAllocator::new();
        for task in &tasks {
            ids.observe(task.id());
        }
        report.loaded = tasks.len();
        self.tasks = tasks;
        self.ids = ids;

        info!(loaded = report.loaded, skipped = report.skipped.len(), store = %store.describe(), "loaded tasks");
        Ok(report)
    }
}
