//! Task form handling for the terminal user interface.
//!
//! The add form collects the fields of any task kind. Priority only applies
//! to personal tasks and team members only to work tasks; the other kinds
//! ignore them.

use chrono::Local;

use crate::error::ValidationError;
use crate::fields::{Kind, Priority};
use crate::manager::TaskManager;
use crate::task::DUE_DATE_FORMAT;
use crate::tui::input::InputField;

/// Order of the form fields.
pub const TITLE_ORDER: usize = 0;
pub const DUE_ORDER: usize = 1;
pub const DESCRIPTION_ORDER: usize = 2;
pub const KIND_ORDER: usize = 3;
pub const PRIORITY_ORDER: usize = 4;
pub const MEMBERS_ORDER: usize = 5;

const FIELD_COUNT: usize = 6;

/// Separates team member names in the members field. Names often contain
/// commas ("Smith, J."), so the form splits on `;` instead.
pub const MEMBER_SEPARATOR: char = ';';

/// Task form for adding tasks
pub struct TaskForm {
    pub title: InputField,
    pub due: InputField,
    pub description: InputField,
    /// Team member names separated by `MEMBER_SEPARATOR`.
    pub members: InputField,
    pub kind: usize,
    pub priority: usize,
    pub current_field: usize,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskForm {
    /// Create an empty form with today's date as the due date.
    pub fn new() -> Self {
        let today = Local::now().date_naive().format(DUE_DATE_FORMAT).to_string();
        let mut form = Self {
            title: InputField::new(),
            due: InputField::with_value(&today),
            description: InputField::new(),
            members: InputField::new(),
            kind: 0,
            priority: 0,
            current_field: TITLE_ORDER,
        };
        form.update_active_field();
        form
    }

    pub fn selected_kind(&self) -> Kind {
        Kind::ALL[self.kind % Kind::ALL.len()]
    }

    pub fn selected_priority(&self) -> Priority {
        Priority::ALL[self.priority % Priority::ALL.len()]
    }

    /// Member names typed into the form; blank entries are dropped.
    pub fn member_names(&self) -> Vec<String> {
        self.members
            .value
            .split(MEMBER_SEPARATOR)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(String::from)
            .collect()
    }

    /// Whether the field at `order` means anything for the selected kind.
    pub fn field_applies(&self, order: usize) -> bool {
        match order {
            PRIORITY_ORDER => self.selected_kind() == Kind::Personal,
            MEMBERS_ORDER => self.selected_kind() == Kind::Work,
            _ => true,
        }
    }

    fn field_mut(&mut self, order: usize) -> Option<&mut InputField> {
        match order {
            TITLE_ORDER => Some(&mut self.title),
            DUE_ORDER => Some(&mut self.due),
            DESCRIPTION_ORDER => Some(&mut self.description),
            MEMBERS_ORDER => Some(&mut self.members),
            _ => None,
        }
    }

    /// Move to the next field that applies to the selected kind.
    pub fn next_field(&mut self) {
        loop {
            self.current_field = (self.current_field + 1) % FIELD_COUNT;
            if self.field_applies(self.current_field) {
                break;
            }
        }
        self.update_active_field();
    }

    /// Move to the previous field that applies to the selected kind.
    pub fn prev_field(&mut self) {
        loop {
            self.current_field = (self.current_field + FIELD_COUNT - 1) % FIELD_COUNT;
            if self.field_applies(self.current_field) {
                break;
            }
        }
        self.update_active_field();
    }

    /// Update which field is currently active for editing.
    pub fn update_active_field(&mut self) {
        for order in [TITLE_ORDER, DUE_ORDER, DESCRIPTION_ORDER, MEMBERS_ORDER] {
            if let Some(field) = self.field_mut(order) {
                field.active = false;
            }
        }
        let current = self.current_field;
        if let Some(field) = self.field_mut(current) {
            field.active = true;
        }
    }

    /// Handle character input for the currently active field.
    pub fn handle_char(&mut self, c: char) {
        let current = self.current_field;
        if let Some(field) = self.field_mut(current) {
            field.handle_char(c);
        }
    }

    pub fn handle_backspace(&mut self) {
        let current = self.current_field;
        if let Some(field) = self.field_mut(current) {
            field.handle_backspace();
        }
    }

    pub fn handle_delete(&mut self) {
        let current = self.current_field;
        if let Some(field) = self.field_mut(current) {
            field.handle_delete();
        }
    }

    /// Handle left/right arrow keys for cursor movement or selector changes.
    pub fn handle_left_right(&mut self, right: bool) {
        let step = |value: usize, len: usize| {
            if right {
                (value + 1) % len
            } else {
                (value + len - 1) % len
            }
        };
        match self.current_field {
            KIND_ORDER => self.kind = step(self.kind, Kind::ALL.len()),
            PRIORITY_ORDER => self.priority = step(self.priority, Priority::ALL.len()),
            current => {
                if let Some(field) = self.field_mut(current) {
                    if right {
                        field.move_cursor_right()
                    } else {
                        field.move_cursor_left()
                    }
                }
            }
        }
    }

    /// Create the task described by the form in `manager`.
    pub fn submit(&self, manager: &mut TaskManager) -> Result<u64, ValidationError> {
        let title = self.title.value.as_str();
        let due = self.due.value.trim();
        let description = Some(self.description.value.as_str()).filter(|d| !d.is_empty());
        match self.selected_kind() {
            Kind::General => manager.create_general(title, due, description),
            Kind::Personal => manager.create_personal(
                title,
                due,
                self.selected_priority().as_str(),
                description,
            ),
            Kind::Work => manager.create_work(title, due, description, &self.member_names()),
        }
    }
}
