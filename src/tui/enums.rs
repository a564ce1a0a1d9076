//! Enumerations for TUI state management.

use chrono::NaiveDate;

use crate::fields::Kind;
use crate::manager::TaskManager;
use crate::task::Task;

/// Application state for the terminal user interface.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum AppState {
    TaskList,
    TaskDetail,
    AddTask,
    Help,
    Confirm,
}

/// Which slice of the collection the task table shows.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum View {
    #[default]
    All,
    Personal,
    Work,
    Pending,
    Overdue,
}

impl View {
    pub const ALL: [View; 5] = [View::All, View::Personal, View::Work, View::Pending, View::Overdue];

    pub fn title(self) -> &'static str {
        match self {
            View::All => "All",
            View::Personal => "Personal",
            View::Work => "Work",
            View::Pending => "Pending",
            View::Overdue => "Overdue",
        }
    }

    /// Cycle forward or backward through the views.
    pub fn cycle(self, forward: bool) -> View {
        let idx = View::ALL.iter().position(|&v| v == self).unwrap_or(0);
        let len = View::ALL.len();
        let next = if forward { (idx + 1) % len } else { (idx + len - 1) % len };
        View::ALL[next]
    }

    /// Ids of the tasks this view shows, in collection order.
    pub fn task_ids(self, manager: &TaskManager, today: NaiveDate) -> Vec<u64> {
        match self {
            View::All => ids(manager.list(None)),
            View::Personal => ids(manager.list(Some(Kind::Personal))),
            View::Work => ids(manager.list(Some(Kind::Work))),
            View::Pending => ids(manager.pending()),
            View::Overdue => ids(manager.overdue(today)),
        }
    }
}

fn ids<'a>(tasks: impl Iterator<Item = &'a Task>) -> Vec<u64> {
    tasks.map(Task::id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_wraps_both_ways() {
        assert_eq!(View::All.cycle(true), View::Personal);
        assert_eq!(View::Overdue.cycle(true), View::All);
        assert_eq!(View::All.cycle(false), View::Overdue);
    }

    #[test]
    fn test_task_ids_per_view() {
        let mut m = TaskManager::new();
        m.create_general("Milk", "2024-01-01", None).unwrap();
        m.create_personal("Gym", "2024-03-01", "low", None).unwrap();
        m.create_work("Ship", "2024-02-01", None, &[]).unwrap();
        m.complete(3).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 2, 15).unwrap();

        assert_eq!(View::All.task_ids(&m, today), [1, 2, 3]);
        assert_eq!(View::Personal.task_ids(&m, today), [2]);
        assert_eq!(View::Work.task_ids(&m, today), [3]);
        assert_eq!(View::Pending.task_ids(&m, today), [1, 2]);
        assert_eq!(View::Overdue.task_ids(&m, today), [1, 3]);
    }
}
