use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use tracing::{debug, error, info, warn};

use crate::error::{Result, TaskError};
use crate::models::{Filter, Priority, Stats, Task};
use crate::snapshot::{ExportDocument, ImportDocument};
use crate::storage::{load_tasks, save_tasks, KeyValueStore};

/// Signals emitted by the store for views to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A task went from open to completed.
    TaskCompleted { id: u64, text: String },
}

/// Current time at the precision timestamps are stored with.
fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

type Subscriber = Box<dyn FnMut(&StoreEvent)>;

/// The ordered task collection plus the current query state.
///
/// Every mutation rewrites the whole collection to storage before returning.
/// A failed save is logged and the in-memory change is kept.
pub struct TaskStore<S: KeyValueStore> {
    tasks: Vec<Task>,
    filter: Filter,
    search: String,
    storage: S,
    last_id: u64,
    subscribers: Vec<Subscriber>,
}

impl<S: KeyValueStore> TaskStore<S> {
    /// Opens a store over `storage`, loading any saved tasks.
    pub fn open(storage: S) -> Self {
        let tasks = load_tasks(&storage);
        let last_id = tasks.iter().map(|t| t.id).max().unwrap_or(0);
        info!(count = tasks.len(), "Loaded tasks");
        Self {
            tasks,
            filter: Filter::default(),
            search: String::new(),
            storage,
            last_id,
            subscribers: Vec::new(),
        }
    }

    /// All tasks in collection order, ignoring filter and search.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Registers a callback invoked for every [`StoreEvent`].
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&StoreEvent) + 'static,
    {
        self.subscribers.push(Box::new(callback));
    }

    /// Creates a task at the front of the list.
    pub fn add(&mut self, text: &str, priority: Priority, deadline: Option<NaiveDate>) -> Result<Task> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TaskError::EmptyText);
        }
        let task = Task {
            id: self.next_id(),
            text: text.to_string(),
            completed: false,
            priority,
            deadline,
            created_at: now_millis(),
            notes: String::new(),
        };
        debug!(id = task.id, "Adding task");
        self.tasks.insert(0, task.clone());
        self.persist();
        Ok(task)
    }

    /// Flips the completion state of a task.
    ///
    /// Emits [`StoreEvent::TaskCompleted`] only when the task becomes completed.
    pub fn toggle(&mut self, id: u64) -> Result<Task> {
        let task = self.find_mut(id)?;
        task.completed = !task.completed;
        let task = task.clone();
        debug!(id, completed = task.completed, "Toggled task");
        self.persist();
        if task.completed {
            self.emit(StoreEvent::TaskCompleted {
                id,
                text: task.text.clone(),
            });
        }
        Ok(task)
    }

    pub fn delete(&mut self, id: u64) -> Result<()> {
        let idx = self.position(id)?;
        self.tasks.remove(idx);
        debug!(id, "Deleted task");
        self.persist();
        Ok(())
    }

    pub fn set_priority(&mut self, id: u64, priority: Priority) -> Result<()> {
        self.find_mut(id)?.priority = priority;
        self.persist();
        Ok(())
    }

    pub fn set_deadline(&mut self, id: u64, deadline: Option<NaiveDate>) -> Result<()> {
        self.find_mut(id)?.deadline = deadline;
        self.persist();
        Ok(())
    }

    pub fn set_notes(&mut self, id: u64, notes: &str) -> Result<()> {
        self.find_mut(id)?.notes = notes.to_string();
        self.persist();
        Ok(())
    }

    /// Replaces the text of a task. Blank text is rejected.
    pub fn set_text(&mut self, id: u64, text: &str) -> Result<()> {
        let text = text.trim();
        let task = self.find_mut(id)?;
        if text.is_empty() {
            return Err(TaskError::EmptyText);
        }
        task.text = text.to_string();
        self.persist();
        Ok(())
    }

    /// Removes every completed task and returns how many were removed.
    pub fn clear_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.completed);
        let removed = before - self.tasks.len();
        debug!(removed, "Cleared completed tasks");
        self.persist();
        removed
    }

    /// Swaps the positions of two tasks.
    pub fn reorder(&mut self, a: u64, b: u64) -> Result<()> {
        let ia = self.position(a)?;
        let ib = self.position(b)?;
        self.tasks.swap(ia, ib);
        debug!(a, b, "Swapped tasks");
        self.persist();
        Ok(())
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    pub fn set_search(&mut self, search: &str) {
        self.search = search.to_string();
    }

    /// Tasks passing both the filter and the search, in collection order.
    pub fn query(&self) -> Vec<&Task> {
        let needle = self.search.trim().to_lowercase();
        self.tasks
            .iter()
            .filter(|t| self.filter.accepts(t))
            .filter(|t| needle.is_empty() || t.matches(&needle))
            .collect()
    }

    pub fn stats(&self) -> Stats {
        Stats::from_tasks(&self.tasks)
    }

    pub fn export_snapshot(&self) -> ExportDocument {
        ExportDocument::new(&self.tasks, Utc::now())
    }

    /// Parses `document` and appends its tasks to the end of the list.
    pub fn import_merge(&mut self, document: &str) -> Result<usize> {
        let import = ImportDocument::parse(document)?;
        Ok(self.merge(import))
    }

    /// Appends an already validated import, keeping the imported ids.
    ///
    /// Ids that collide with existing tasks are kept as they are and logged.
    pub fn merge(&mut self, import: ImportDocument) -> usize {
        let now = now_millis();
        let count = import.len();
        // Ids minted for records without one must clear every explicit id in
        // the import, including records that come later.
        let reserved: HashSet<u64> = import.tasks.iter().filter_map(|r| r.id).collect();
        if let Some(max) = reserved.iter().max() {
            self.last_id = self.last_id.max(*max);
        }
        for record in import.tasks {
            let task = record.into_task(|| self.next_id_excluding(&reserved), now);
            if self.tasks.iter().any(|t| t.id == task.id) {
                warn!(id = task.id, "Imported task id duplicates an existing task");
            }
            self.last_id = self.last_id.max(task.id);
            self.tasks.push(task);
        }
        info!(count, "Imported tasks");
        self.persist();
        count
    }

    fn next_id(&mut self) -> u64 {
        self.next_id_excluding(&HashSet::new())
    }

    /// Next id: the current time in milliseconds, bumped past every id
    /// already handed out.
    ///
    /// Once `u64::MAX` is taken the counter cannot move further, so the
    /// smallest id not used by a task or listed in `reserved` is returned.
    fn next_id_excluding(&mut self, reserved: &HashSet<u64>) -> u64 {
        if let Some(floor) = self.last_id.checked_add(1) {
            let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
            let id = now.max(floor);
            self.last_id = id;
            return id;
        }
        let used: HashSet<u64> = self.tasks.iter().map(|t| t.id).collect();
        let id = (0..=u64::MAX)
            .find(|id| !used.contains(id) && !reserved.contains(id))
            .unwrap_or(0);
        warn!(id, "Id counter exhausted, reusing the smallest free id");
        id
    }

    fn position(&self, id: u64) -> Result<usize> {
        self.tasks.iter().position(|t| t.id == id).ok_or(TaskError::NotFound(id))
    }

    fn find_mut(&mut self, id: u64) -> Result<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id).ok_or(TaskError::NotFound(id))
    }

    fn persist(&mut self) {
        if let Err(e) = save_tasks(&mut self.storage, &self.tasks) {
            error!(error = %e, "Failed to save tasks");
        }
    }

    fn emit(&mut self, event: StoreEvent) {
        for subscriber in self.subscribers.iter_mut() {
            subscriber(&event);
        }
    }
}
