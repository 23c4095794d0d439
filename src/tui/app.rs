use std::sync::mpsc::{self, Receiver};

use chrono::NaiveDate;
use ratatui::widgets::TableState;
use tracing::warn;

use crate::models::{Priority, Task};
use crate::storage::KeyValueStore;
use crate::store::{StoreEvent, TaskStore};
use crate::theme::{load_theme, save_theme, Theme};

#[derive(PartialEq)]
pub enum InputMode {
    Normal,
    Editing,
    Adding,
}

#[derive(PartialEq)]
pub enum InputField {
    None,
    Text,
    Notes,
    Deadline,
    Search,
}

/// State for the multi-step "Add Task" wizard.
#[derive(Default)]
pub struct AddState {
    pub text: String,
    pub priority: Priority,
    pub step: usize, // 0: Text, 1: Priority, 2: Deadline
}

pub struct App<S: KeyValueStore> {
    pub store: TaskStore<S>,
    /// Result of the last query, in display order.
    pub visible: Vec<Task>,
    pub state: TableState,
    pub input_mode: InputMode,
    pub input_field: InputField,
    pub input_buffer: String,
    pub target_id: Option<u64>,
    pub add_state: AddState,
    pub theme: Theme,
    /// One-line message shown above the help bar.
    pub status: Option<String>,
    events: Receiver<StoreEvent>,
}

impl<S: KeyValueStore> App<S> {
    /// Wraps a store and subscribes to its events.
    pub fn new(mut store: TaskStore<S>) -> App<S> {
        let (tx, events) = mpsc::channel();
        store.subscribe(move |event| {
            let _ = tx.send(event.clone());
        });
        let theme = load_theme(store.storage());

        let mut app = App {
            store,
            visible: Vec::new(),
            state: TableState::default(),
            input_mode: InputMode::Normal,
            input_field: InputField::None,
            input_buffer: String::new(),
            target_id: None,
            add_state: AddState::default(),
            theme,
            status: None,
            events,
        };
        app.reload();
        app
    }

    /// Re-runs the query, keeps the selection in range and picks up events.
    pub fn reload(&mut self) {
        self.visible = self.store.query().into_iter().cloned().collect();

        if self.visible.is_empty() {
            self.state.select(None);
        } else if let Some(i) = self.state.selected() {
            if i >= self.visible.len() {
                self.state.select(Some(self.visible.len() - 1));
            }
        } else {
            self.state.select(Some(0));
        }

        while let Ok(event) = self.events.try_recv() {
            match event {
                StoreEvent::TaskCompleted { text, .. } => {
                    self.status = Some(format!("🎉 Completed \"{}\". Nice work!", text));
                }
            }
        }
    }

    fn selected_id(&self) -> Option<u64> {
        self.state.selected().and_then(|i| self.visible.get(i)).map(|t| t.id)
    }

    /// Selects the next task, wrapping around.
    pub fn next(&mut self) {
        if self.visible.is_empty() { return; }
        let i = match self.state.selected() {
            Some(i) if i + 1 < self.visible.len() => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    /// Selects the previous task, wrapping around.
    pub fn previous(&mut self) {
        if self.visible.is_empty() { return; }
        let i = match self.state.selected() {
            Some(0) | None => self.visible.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn toggle_selected(&mut self) {
        let Some(id) = self.selected_id() else { return };
        self.status = None;
        if let Err(e) = self.store.toggle(id) {
            warn!(error = %e, "Toggle from TUI failed");
        }
        self.reload();
    }

    pub fn delete_selected(&mut self) {
        let Some(id) = self.selected_id() else { return };
        match self.store.delete(id) {
            Ok(()) => self.status = Some("Task deleted.".to_string()),
            Err(e) => warn!(error = %e, "Delete from TUI failed"),
        }
        self.reload();
    }

    pub fn cycle_priority(&mut self) {
        let Some(id) = self.selected_id() else { return };
        let Some(current) = self.store.get(id).map(|t| t.priority) else { return };
        if let Err(e) = self.store.set_priority(id, current.cycled()) {
            warn!(error = %e, "Priority change from TUI failed");
        }
        self.reload();
    }

    pub fn cycle_filter(&mut self) {
        self.store.set_filter(self.store.filter().cycled());
        self.state.select(None);
        self.reload();
    }

    pub fn clear_completed(&mut self) {
        let removed = self.store.clear_completed();
        self.status = Some(format!("Removed {} completed task(s).", removed));
        self.reload();
    }

    /// Swaps the selected task with its visible neighbour below (`down`) or
    /// above, and keeps it selected.
    pub fn move_selected(&mut self, down: bool) {
        let Some(i) = self.state.selected() else { return };
        let j = if down { i + 1 } else { i.wrapping_sub(1) };
        let (Some(a), Some(b)) = (self.visible.get(i), self.visible.get(j)) else { return };
        let (a, b) = (a.id, b.id);
        if let Err(e) = self.store.reorder(a, b) {
            warn!(error = %e, "Reorder from TUI failed");
            return;
        }
        self.state.select(Some(j));
        self.reload();
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        if let Err(e) = save_theme(self.store.storage_mut(), self.theme) {
            warn!(error = %e, "Failed to save theme");
        }
    }

    /// Initiates the "Add Task" wizard.
    pub fn start_add(&mut self) {
        self.input_mode = InputMode::Adding;
        self.add_state = AddState::default();
        self.input_buffer.clear();
        self.status = None;
    }

    /// Initiates editing of a field of the selected task.
    pub fn start_edit(&mut self, field: InputField) {
        let Some(i) = self.state.selected() else { return };
        let Some(t) = self.visible.get(i) else { return };
        self.target_id = Some(t.id);
        // Pre-fill buffer for editing
        self.input_buffer = match field {
            InputField::Text => t.text.clone(),
            InputField::Notes => t.notes.clone(),
            InputField::Deadline => t.deadline.map(|d| d.to_string()).unwrap_or_default(),
            _ => String::new(),
        };
        self.input_field = field;
        self.input_mode = InputMode::Editing;
        self.status = None;
    }

    /// Starts a live search, pre-filled with the current one.
    pub fn start_search(&mut self) {
        self.input_buffer = self.store.search().to_string();
        self.input_field = InputField::Search;
        self.input_mode = InputMode::Editing;
    }

    pub fn push_char(&mut self, c: char) {
        self.input_buffer.push(c);
        self.update_live_search();
    }

    pub fn pop_char(&mut self) {
        self.input_buffer.pop();
        self.update_live_search();
    }

    fn update_live_search(&mut self) {
        if self.input_mode == InputMode::Editing && self.input_field == InputField::Search {
            self.store.set_search(&self.input_buffer);
            self.reload();
        }
    }

    /// Leaves input mode. Escaping a search clears it.
    pub fn cancel_input(&mut self) {
        if self.input_field == InputField::Search {
            self.store.set_search("");
            self.reload();
        }
        self.input_mode = InputMode::Normal;
        self.input_field = InputField::None;
        self.input_buffer.clear();
    }

    /// Handles text input based on the current mode.
    pub fn handle_input(&mut self) {
        match self.input_mode {
            InputMode::Adding => self.handle_adding_input(),
            InputMode::Editing => self.handle_editing_input(),
            InputMode::Normal => {}
        }
    }

    /// Handles input for the "Add Task" wizard.
    fn handle_adding_input(&mut self) {
        match self.add_state.step {
            0 => { // Text
                if !self.input_buffer.trim().is_empty() {
                    self.add_state.text = self.input_buffer.clone();
                    self.add_state.step += 1;
                    self.input_buffer.clear();
                }
            }
            1 => { // Priority
                if self.input_buffer.trim().is_empty() {
                    self.add_state.priority = Priority::default();
                } else {
                    match self.input_buffer.parse::<Priority>() {
                        Ok(p) => self.add_state.priority = p,
                        Err(e) => {
                            self.status = Some(e);
                            return;
                        }
                    }
                }
                self.add_state.step += 1;
                self.input_buffer.clear();
            }
            2 => { // Deadline
                let Some(deadline) = self.parse_deadline_input() else { return };
                match self.store.add(&self.add_state.text, self.add_state.priority, deadline) {
                    Ok(_) => self.status = Some("Task added.".to_string()),
                    Err(e) => self.status = Some(e.to_string()),
                }
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
                self.state.select(Some(0));
                self.reload();
            }
            _ => {}
        }
    }

    /// Handles input for the edit prompts.
    fn handle_editing_input(&mut self) {
        if self.input_field == InputField::Search {
            self.input_mode = InputMode::Normal;
            self.input_field = InputField::None;
            self.input_buffer.clear();
            return;
        }
        let Some(id) = self.target_id else { return };
        let result = match self.input_field {
            InputField::Text => self.store.set_text(id, &self.input_buffer),
            InputField::Notes => self.store.set_notes(id, &self.input_buffer),
            InputField::Deadline => {
                let Some(deadline) = self.parse_deadline_input() else { return };
                self.store.set_deadline(id, deadline)
            }
            InputField::None | InputField::Search => Ok(()),
        };
        if let Err(e) = result {
            self.status = Some(e.to_string());
        }
        self.input_mode = InputMode::Normal;
        self.input_field = InputField::None;
        self.input_buffer.clear();
        self.reload();
    }

    /// `Some(None)` for an empty buffer, `None` (with a status message) when
    /// the date does not parse.
    fn parse_deadline_input(&mut self) -> Option<Option<NaiveDate>> {
        let raw = self.input_buffer.trim();
        if raw.is_empty() {
            return Some(None);
        }
        match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(d) => Some(Some(d)),
            Err(_) => {
                self.status = Some(format!("Invalid date '{}'. Use YYYY-MM-DD.", raw));
                None
            }
        }
    }
}
