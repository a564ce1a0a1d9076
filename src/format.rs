//! Formatting helpers shared by the CLI and the TUI.

use chrono::NaiveDate;

use crate::task::{Task, DUE_DATE_FORMAT};

/// Format a due date relative to today ("today", "tomorrow", "in 3d", "2d late").
pub fn format_due_relative(due: NaiveDate, today: NaiveDate) -> String {
    let delta = (due - today).num_days();
    match delta {
        0 => "today".into(),
        1 => "tomorrow".into(),
        d if d > 1 => format!("in {d}d"),
        d => format!("{}d late", -d),
    }
}

/// Kind-specific column for tables: priority or team members.
pub fn format_extra(task: &Task) -> String {
    if let Some(priority) = task.priority() {
        return priority.to_string();
    }
    if task.team_members().is_empty() {
        "-".into()
    } else {
        task.team_members().join(", ")
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

/// Print tasks in a formatted table.
pub fn print_table<'a>(tasks: impl IntoIterator<Item = &'a Task>, today: NaiveDate) {
    println!(
        "{:<5} {:<9} {:<10} {:<11} {:<10} {:<16} {:<14} {}",
        "ID", "Kind", "Status", "Due", "When", "Description", "Extra", "Title"
    );
    for t in tasks {
        println!(
            "{:<5} {:<9} {:<10} {:<11} {:<10} {:<16} {:<14} {}",
            t.id(),
            t.kind(),
            t.status(),
            t.due_date().format(DUE_DATE_FORMAT).to_string(),
            format_due_relative(t.due_date(), today),
            t.description(),
            truncate(&format_extra(t), 14),
            t.title()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::IdAllocator;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DUE_DATE_FORMAT).unwrap()
    }

    #[test]
    fn test_format_due_relative() {
        let today = date("2024-06-10");
        assert_eq!(format_due_relative(date("2024-06-10"), today), "today");
        assert_eq!(format_due_relative(date("2024-06-11"), today), "tomorrow");
        assert_eq!(format_due_relative(date("2024-06-14"), today), "in 4d");
        assert_eq!(format_due_relative(date("2024-06-08"), today), "2d late");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Alice, Bob, Carol", 8), "Alice, …");
    }

    #[test]
    fn test_format_extra() {
        let mut ids = IdAllocator::new();
        let personal = Task::personal(&mut ids, "p", "2024-01-01", "high", None).unwrap();
        let mut work = Task::work(&mut ids, "w", "2024-01-01", None).unwrap();
        let general = Task::general(&mut ids, "g", "2024-01-01", None).unwrap();
        assert_eq!(format_extra(&personal), "high");
        assert_eq!(format_extra(&work), "-");
        work.add_team_member("Ann").unwrap();
        work.add_team_member("Ben").unwrap();
        assert_eq!(format_extra(&work), "Ann, Ben");
        assert_eq!(format_extra(&general), "-");
    }
}
