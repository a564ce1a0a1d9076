//! Main application logic for the terminal user interface.
//!
//! This module contains the `App` struct which manages the TUI state,
//! handles user input, renders the interface, and coordinates between
//! the task table, the detail view, the add form and dialogs. Every change
//! is written to the store as soon as it is made.

use std::io;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use crossterm::{
    cursor::Show,
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use tracing::{error, info};

use crate::fields::{Kind, Status};
use crate::format::{format_due_relative, format_extra};
use crate::manager::TaskManager;
use crate::store::TaskStore;
use crate::task::{Task, TaskDetails, DUE_DATE_FORMAT};
use crate::tui::{
    colors::{kind_color, text_on, DARK_RED, GOLD},
    enums::{AppState, View},
    input::InputField,
    task_form::{TaskForm, KIND_ORDER, MEMBERS_ORDER, MEMBER_SEPARATOR, PRIORITY_ORDER},
    utils::centered_rect,
};

/// Main application state for the terminal user interface.
pub struct App {
    state: AppState,
    manager: TaskManager,
    store: Box<dyn TaskStore>,
    view: View,
    task_list_state: TableState,
    visible_tasks: Vec<u64>,
    task_form: TaskForm,
    status_message: String,
    confirm_action: Option<String>,
}

impl App {
    /// Create a new App over an already loaded manager and its store.
    pub fn new(manager: TaskManager, store: Box<dyn TaskStore>) -> Self {
        let mut app = App {
            state: AppState::TaskList,
            manager,
            store,
            view: View::default(),
            task_list_state: TableState::default(),
            visible_tasks: Vec::new(),
            task_form: TaskForm::new(),
            status_message: String::new(),
            confirm_action: None,
        };
        app.refresh_tasks();
        app
    }

    pub fn manager(&self) -> &TaskManager {
        &self.manager
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    /// Recompute the visible rows for the current view, keeping the selection in range.
    fn refresh_tasks(&mut self) {
        let selected_id = self.selected_id();
        self.visible_tasks = self.view.task_ids(&self.manager, Self::today());

        let idx = selected_id
            .and_then(|id| self.visible_tasks.iter().position(|&t| t == id))
            .or_else(|| {
                self.task_list_state
                    .selected()
                    .map(|i| i.min(self.visible_tasks.len().saturating_sub(1)))
            })
            .or(Some(0));
        if self.visible_tasks.is_empty() {
            self.task_list_state.select(None);
        } else {
            self.task_list_state.select(idx);
        }
    }

    /// Save the collection and refresh the table. Failures go to the status bar.
    fn save(&mut self) -> bool {
        let result = self.manager.save_all(self.store.as_mut());
        self.refresh_tasks();
        match result {
            Ok(()) => true,
            Err(e) => {
                error!(store = %self.store.describe(), "failed to save tasks: {e}");
                self.set_status_message(format!("Save failed: {e}"));
                false
            }
        }
    }

    fn selected_id(&self) -> Option<u64> {
        self.task_list_state
            .selected()
            .and_then(|i| self.visible_tasks.get(i).copied())
    }

    fn get_selected_task(&self) -> Option<&Task> {
        self.selected_id().and_then(|id| self.manager.get(id))
    }

    fn set_status_message(&mut self, msg: String) {
        self.status_message = msg;
    }

    fn clear_status_message(&mut self) {
        self.status_message.clear();
    }

    fn set_view(&mut self, view: View) {
        self.view = view;
        self.task_list_state.select(None);
        self.refresh_tasks();
    }

    fn move_selection(&mut self, down: bool) {
        if self.visible_tasks.is_empty() {
            return;
        }
        let last = self.visible_tasks.len() - 1;
        let next = match self.task_list_state.selected() {
            Some(i) if down => (i + 1).min(last),
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.task_list_state.select(Some(next));
    }

    fn complete_selected_task(&mut self) {
        let Some(id) = self.selected_id() else {
            self.set_status_message("No task selected".to_string());
            return;
        };
        if let Err(e) = self.manager.complete(id) {
            self.set_status_message(format!("Error: {e}"));
            return;
        }
        if self.save() {
            info!(id, "completed task");
            self.set_status_message(format!("Task {id} marked as completed"));
        }
    }

    fn delete_selected_task(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        match self.manager.delete(id) {
            Ok(task) => {
                if self.save() {
                    info!(id, "deleted task");
                    self.set_status_message(format!("Deleted task {id}: {}", task.title()));
                }
            }
            Err(_) => self.set_status_message("Task not found.".to_string()),
        }
    }

    fn create_task(&mut self) {
        match self.task_form.submit(&mut self.manager) {
            Ok(id) => {
                if self.save() {
                    info!(id, "added task");
                    self.set_status_message(format!("Added task {id}"));
                }
                if let Some(pos) = self.visible_tasks.iter().position(|&t| t == id) {
                    self.task_list_state.select(Some(pos));
                }
                self.state = AppState::TaskList;
            }
            Err(e) => self.set_status_message(format!("Error: {e}")),
        }
    }

    /// Handle keyboard input in the task table.
    ///
    /// Returns true if the application should quit.
    fn handle_task_list_input(&mut self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(false),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(true),
            KeyCode::Tab => self.set_view(self.view.cycle(true)),
            KeyCode::BackTab => self.set_view(self.view.cycle(false)),
            KeyCode::Enter | KeyCode::Char(' ') => {
                if self.selected_id().is_some() {
                    self.state = AppState::TaskDetail;
                }
            }
            KeyCode::Char('a') => {
                self.task_form = TaskForm::new();
                self.state = AppState::AddTask;
            }
            KeyCode::Char('c') => self.complete_selected_task(),
            KeyCode::Char('d') => {
                if let Some(task) = self.get_selected_task() {
                    self.confirm_action = Some(format!("Delete task {}: {}", task.id(), task.title()));
                    self.state = AppState::Confirm;
                }
            }
            KeyCode::Char('r') => {
                self.refresh_tasks();
                self.set_status_message("Refreshed".to_string());
            }
            KeyCode::Char('h') | KeyCode::F(1) => self.state = AppState::Help,
            _ => {}
        }
        false
    }

    fn handle_detail_input(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter => self.state = AppState::TaskList,
            KeyCode::Char('c') => self.complete_selected_task(),
            KeyCode::Char('d') => {
                if let Some(task) = self.get_selected_task() {
                    self.confirm_action = Some(format!("Delete task {}: {}", task.id(), task.title()));
                    self.state = AppState::Confirm;
                }
            }
            _ => {}
        }
        false
    }

    fn handle_form_input(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Esc => {
                self.state = AppState::TaskList;
                self.set_status_message("Cancelled".to_string());
            }
            KeyCode::Enter => self.create_task(),
            KeyCode::Tab | KeyCode::Down => self.task_form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.task_form.prev_field(),
            KeyCode::Left => self.task_form.handle_left_right(false),
            KeyCode::Right => self.task_form.handle_left_right(true),
            KeyCode::Backspace => self.task_form.handle_backspace(),
            KeyCode::Delete => self.task_form.handle_delete(),
            KeyCode::Char(c) => self.task_form.handle_char(c),
            _ => {}
        }
        false
    }

    fn handle_confirm_input(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                if self.confirm_action.is_some() {
                    self.delete_selected_task();
                }
                self.state = AppState::TaskList;
                self.confirm_action = None;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.state = AppState::TaskList;
                self.confirm_action = None;
            }
            _ => {}
        }
        false
    }

    fn handle_help_input(&mut self, key: KeyCode) -> bool {
        if matches!(key, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('h')) {
            self.state = AppState::TaskList;
        }
        false
    }

    /// Dispatch one key press for the current state.
    ///
    /// Returns true if the application should quit.
    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        self.clear_status_message();
        match self.state {
            AppState::TaskList => self.handle_task_list_input(key, modifiers),
            AppState::TaskDetail => self.handle_detail_input(key),
            AppState::AddTask => self.handle_form_input(key),
            AppState::Help => self.handle_help_input(key),
            AppState::Confirm => self.handle_confirm_input(key),
        }
    }

    /// Poll for and handle keyboard events.
    ///
    /// Returns true if the application should quit.
    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(self.handle_key(key.code, key.modifiers));
                }
            }
        }
        Ok(false)
    }

    fn view_color(&self) -> Color {
        match self.view {
            View::Personal => kind_color(Kind::Personal),
            View::Work => kind_color(Kind::Work),
            View::Overdue => DARK_RED,
            View::All | View::Pending => Color::Blue,
        }
    }

    /// Render the view tabs and the task table.
    fn render_task_list(&mut self, f: &mut Frame, area: Rect) {
        let today = Self::today();
        let view_color = self.view_color();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let mut tabs = vec![
            Span::styled("TASKS", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
        ];
        for view in View::ALL {
            let style = if view == self.view {
                Style::default()
                    .bg(view_color)
                    .fg(text_on(view_color))
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Cyan)
            };
            tabs.push(Span::styled(format!(" {} ", view.title()), style));
            tabs.push(Span::raw(" "));
        }
        let header_block = Paragraph::new(Line::from(tabs))
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(header_block, chunks[0]);

        let header_cells = ["ID", "Kind", "Status", "Due", "When", "Priority/Team", "Description", "Title"]
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().add_modifier(Modifier::BOLD)));
        let header = Row::new(header_cells)
            .style(Style::default().bg(view_color).fg(text_on(view_color)))
            .height(1);

        let rows: Vec<Row> = self
            .visible_tasks
            .iter()
            .filter_map(|&id| self.manager.get(id))
            .map(|task| {
                let style = match task.status() {
                    Status::Completed => Style::default().fg(Color::DarkGray),
                    Status::Pending if task.is_overdue(today) => Style::default().fg(Color::Red),
                    Status::Pending if task.is_high_priority() => {
                        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
                    }
                    Status::Pending => Style::default().fg(Color::White),
                };
                Row::new(vec![
                    Cell::from(task.id().to_string()),
                    Cell::from(task.kind().as_str()).style(Style::default().fg(kind_color(task.kind()))),
                    Cell::from(task.status().as_str()),
                    Cell::from(task.due_date().format(DUE_DATE_FORMAT).to_string()),
                    Cell::from(format_due_relative(task.due_date(), today)),
                    Cell::from(format_extra(task)),
                    Cell::from(task.description().to_string()),
                    Cell::from(task.title().to_string()),
                ])
                .style(style)
            })
            .collect();

        let widths = [
            Constraint::Length(4),  // ID
            Constraint::Length(9),  // Kind
            Constraint::Length(10), // Status
            Constraint::Length(11), // Due
            Constraint::Length(10), // When
            Constraint::Length(18), // Priority/Team
            Constraint::Length(16), // Description
            Constraint::Min(20),    // Title
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title(format!(
                "{} tasks ({}/{}) - Press 'h' for help",
                self.view.title(),
                self.visible_tasks.len(),
                self.manager.len()
            )))
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");

        f.render_stateful_widget(table, chunks[1], &mut self.task_list_state);
    }

    fn render_task_detail(&mut self, f: &mut Frame, area: Rect) {
        let Some(task) = self.get_selected_task() else {
            let paragraph = Paragraph::new("No task selected")
                .block(Block::default().borders(Borders::ALL).title("Task"));
            f.render_widget(paragraph, area);
            return;
        };
        let today = Self::today();
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let field = |name: &'static str, value: String| {
            Line::from(vec![Span::styled(format!("{name:<14}"), bold), Span::raw(value)])
        };

        let mut lines = vec![
            field("ID:", task.id().to_string()),
            field("Title:", task.title().to_string()),
            field("Kind:", task.kind().to_string()),
            field("Status:", task.status().to_string()),
            field(
                "Due:",
                format!(
                    "{} ({})",
                    task.due_date().format(DUE_DATE_FORMAT),
                    format_due_relative(task.due_date(), today)
                ),
            ),
            field("Description:", task.description().to_string()),
        ];
        match task.details() {
            TaskDetails::General => {}
            TaskDetails::Personal { priority } => lines.push(field("Priority:", priority.to_string())),
            TaskDetails::Work { team_members } => {
                let members = if team_members.is_empty() {
                    "None".to_string()
                } else {
                    team_members.join(", ")
                };
                lines.push(field("Team Members:", members));
            }
        }
        lines.push(Line::from(""));
        lines.push(Line::from("c complete  d delete  Esc back"));

        let color = kind_color(task.kind());
        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color))
                    .title(format!("Task {}", task.id())),
            )
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_input(&self, f: &mut Frame, area: Rect, field: &InputField, title: &str) {
        let focused = field.active;
        let style = if focused { Style::default().fg(GOLD) } else { Style::default() };
        let input = Paragraph::new(field.value.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .title(title.to_string())
                .border_style(style),
        );
        f.render_widget(input, area);
        if focused {
            f.set_cursor_position((area.x + 1 + field.cursor as u16, area.y + 1));
        }
    }

    fn render_selector(&self, f: &mut Frame, area: Rect, value: &str, title: &str, order: usize) {
        let style = if self.task_form.current_field == order {
            Style::default().fg(GOLD)
        } else if !self.task_form.field_applies(order) {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };
        let selector = Paragraph::new(format!("< {value} >")).block(
            Block::default()
                .borders(Borders::ALL)
                .title(title.to_string())
                .border_style(style),
        );
        f.render_widget(selector, area);
    }

    fn render_task_form(&mut self, f: &mut Frame, area: Rect) {
        let area = centered_rect(60, 90, area);
        f.render_widget(Clear, area);
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Add Task {}", self.manager.next_id()));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Length(3), // Due date
                Constraint::Length(3), // Description
                Constraint::Length(3), // Kind
                Constraint::Length(3), // Priority
                Constraint::Length(3), // Team members
                Constraint::Min(1),    // Instructions
            ])
            .split(inner);

        let form = &self.task_form;
        self.render_input(f, chunks[0], &form.title, "Title *");
        self.render_input(f, chunks[1], &form.due, "Due Date * (YYYY-MM-DD)");
        self.render_input(f, chunks[2], &form.description, "Description (max 15)");
        self.render_selector(f, chunks[3], form.selected_kind().as_str(), "Kind", KIND_ORDER);
        self.render_selector(
            f,
            chunks[4],
            form.selected_priority().as_str(),
            "Priority (personal)",
            PRIORITY_ORDER,
        );
        if form.field_applies(MEMBERS_ORDER) {
            let title = format!("Team Members (separate with {MEMBER_SEPARATOR})");
            self.render_input(f, chunks[5], &form.members, &title);
        } else {
            self.render_selector(f, chunks[5], "-", "Team Members (work)", MEMBERS_ORDER);
        }

        let instructions = Paragraph::new(
            "Tab/Up/Down move between fields  Left/Right change selectors  Enter create  Esc cancel",
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
        f.render_widget(instructions, chunks[6]);
    }

    fn render_help(&mut self, f: &mut Frame, area: Rect) {
        let heading = |text: &'static str| {
            Line::from(vec![Span::styled(text, Style::default().add_modifier(Modifier::BOLD))])
        };
        let help_text = vec![
            heading("Task Tracker Help"),
            Line::from(""),
            heading("Task List:"),
            Line::from("  Up/Down, k/j   Move selection"),
            Line::from("  Tab/Shift+Tab  Switch view (All, Personal, Work, Pending, Overdue)"),
            Line::from("  Enter/Space    View task details"),
            Line::from("  a              Add new task"),
            Line::from("  c              Mark selected task as completed"),
            Line::from("  d              Delete selected task (asks for confirmation)"),
            Line::from("  r              Refresh"),
            Line::from("  h/F1           Show this help"),
            Line::from("  q/Esc/Ctrl+C   Quit"),
            Line::from(""),
            heading("Add Form:"),
            Line::from("  Tab/Up/Down    Move between fields"),
            Line::from("  Left/Right     Change kind and priority"),
            Line::from("  Enter          Create task"),
            Line::from("  Esc            Cancel"),
            Line::from(""),
            heading("Rules:"),
            Line::from("  Due dates are YYYY-MM-DD, descriptions hold at most 15 characters."),
            Line::from("  Priority applies to personal tasks, team members to work tasks."),
            Line::from("  Every change is saved immediately."),
        ];

        let paragraph = Paragraph::new(help_text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Help - Press Esc to return"),
            )
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    /// Render a confirmation dialog for destructive actions.
    fn render_confirm(&mut self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .title("Confirm Action")
            .borders(Borders::ALL)
            .style(Style::default().bg(DARK_RED));

        let area = centered_rect(50, 20, area);
        f.render_widget(Clear, area);

        let text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "Are you sure you want to:",
                Style::default().add_modifier(Modifier::BOLD),
            )]),
            Line::from(self.confirm_action.as_deref().unwrap_or("")),
            Line::from(""),
            Line::from("Press 'y' to confirm, 'n' to cancel"),
        ];

        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_status_bar(&mut self, f: &mut Frame, area: Rect) {
        let status_text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            match self.state {
                AppState::TaskList => format!(
                    "{} | {} | Press 'h' for help",
                    self.store.describe(),
                    self.view.title()
                ),
                AppState::TaskDetail => "Task Details".to_string(),
                AppState::AddTask => "Add New Task".to_string(),
                AppState::Help => "Help".to_string(),
                AppState::Confirm => "Confirm Action".to_string(),
            }
        };

        let bg = if self.status_message.starts_with("Error") || self.status_message.starts_with("Save failed") {
            DARK_RED
        } else {
            self.view_color()
        };
        let status = Paragraph::new(status_text)
            .style(Style::default().bg(bg).fg(text_on(bg)))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    /// Main render function that dispatches to appropriate view renderers.
    pub fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());

        match self.state {
            AppState::TaskList => self.render_task_list(f, chunks[0]),
            AppState::TaskDetail => self.render_task_detail(f, chunks[0]),
            AppState::AddTask => {
                self.render_task_list(f, chunks[0]);
                self.render_task_form(f, chunks[0]);
            }
            AppState::Help => self.render_help(f, chunks[0]),
            AppState::Confirm => {
                self.render_task_list(f, chunks[0]);
                self.render_confirm(f, chunks[0]);
            }
        }

        self.render_status_bar(f, chunks[1]);
    }

    /// Main event loop for the TUI application.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}

/// Raw mode on the alternate screen for as long as it lives.
struct RawTerminal;

impl RawTerminal {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let guard = RawTerminal;
        execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture)?;
        Ok(guard)
    }
}

impl Drop for RawTerminal {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            error!("failed to leave raw mode: {e}");
        }
        if let Err(e) = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture, Show) {
            error!("failed to restore the terminal: {e}");
        }
    }
}

/// Browse and edit `manager` until the user quits. The terminal is restored
/// on every exit path, errors included.
pub fn run_tui(manager: TaskManager, store: Box<dyn TaskStore>) -> io::Result<()> {
    let _raw = RawTerminal::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    App::new(manager, store).run(&mut terminal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::JsonStore;
    use ratatui::backend::TestBackend;
    use std::path::Path;

    fn app_with_tasks(path: &Path) -> App {
        let mut m = TaskManager::new();
        m.create_general("Milk", "2024-01-01", None).unwrap();
        m.create_personal("Gym", "2999-01-01", "high", None).unwrap();
        m.create_work("Ship", "2999-02-01", None, &["Ann".into()]).unwrap();
        App::new(m, Box::new(JsonStore::new(path)))
    }

    fn press(app: &mut App, key: KeyCode) -> bool {
        app.handle_key(key, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn reload(path: &Path) -> TaskManager {
        TaskManager::from_store(&mut JsonStore::new(path)).unwrap().0
    }

    #[test]
    fn test_tab_cycles_views() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_tasks(&dir.path().join("tasks.json"));
        assert_eq!(app.view(), View::All);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.view(), View::Personal);
        assert_eq!(app.visible_tasks, [2]);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.view(), View::Overdue);
        assert_eq!(app.visible_tasks, [1]);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.view(), View::Pending);
    }

    #[test]
    fn test_complete_saves_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        let mut app = app_with_tasks(&path);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char('c'));
        assert_eq!(app.status_message(), "Task 2 marked as completed");
        assert_eq!(reload(&path).get(2).unwrap().status(), Status::Completed);
    }

    #[test]
    fn test_delete_asks_for_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        let mut app = app_with_tasks(&path);

        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.state(), AppState::Confirm);
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.state(), AppState::TaskList);
        assert_eq!(app.manager().len(), 3);

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.manager().len(), 2);
        assert!(reload(&path).get(1).is_none());
    }

    #[test]
    fn test_add_form_creates_task() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        let mut app = app_with_tasks(&path);

        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.state(), AppState::AddTask);
        type_text(&mut app, "Read");
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.state(), AppState::TaskList);
        let loaded = reload(&path);
        let task = loaded.get(4).unwrap();
        assert_eq!(task.title(), "Read");
        assert_eq!(task.kind(), Kind::Personal);
    }

    #[test]
    fn test_add_form_work_members_may_contain_commas() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        let mut app = app_with_tasks(&path);
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();

        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "Audit");
        for _ in 0..3 {
            press(&mut app, KeyCode::Tab);
        }
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "Smith, J.; Lee");

        terminal.draw(|f| app.render(f)).unwrap();
        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(screen.contains("separate with ;"));

        press(&mut app, KeyCode::Enter);
        let loaded = reload(&path);
        let task = loaded.get(4).unwrap();
        assert_eq!(task.kind(), Kind::Work);
        assert_eq!(task.team_members(), ["Smith, J.", "Lee"]);
    }

    #[test]
    fn test_add_form_shows_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        let mut app = app_with_tasks(&path);

        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state(), AppState::AddTask);
        assert!(app.status_message().starts_with("Error: title"));
        assert_eq!(app.manager().len(), 3);
        assert!(!path.exists());
    }

    #[test]
    fn test_quit_and_help() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_tasks(&dir.path().join("tasks.json"));
        press(&mut app, KeyCode::Char('h'));
        assert_eq!(app.state(), AppState::Help);
        assert!(!press(&mut app, KeyCode::Char('q')));
        assert_eq!(app.state(), AppState::TaskList);
        assert!(press(&mut app, KeyCode::Char('q')));
    }

    #[test]
    fn test_render_every_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_tasks(&dir.path().join("tasks.json"));
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();

        for key in [KeyCode::Enter, KeyCode::Esc, KeyCode::Char('a'), KeyCode::Esc, KeyCode::Char('d')] {
            terminal.draw(|f| app.render(f)).unwrap();
            press(&mut app, key);
        }
        terminal.draw(|f| app.render(f)).unwrap();
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Char('h'));
        terminal.draw(|f| app.render(f)).unwrap();
    }
}
