use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use chrono::{Local, NaiveDate, Utc};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::deadline::{relative_age, DeadlineStatus};
use crate::models::{Filter, Priority, Task};
use crate::share::share_text;
use crate::snapshot::{export_file_name, ImportDocument};
use crate::storage::KeyValueStore;
use crate::store::TaskStore;
use crate::theme::{load_theme, save_theme, Theme};

fn parse_date(s: &str, silent: bool) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d") {
        Ok(d) => Some(d),
        Err(e) => {
            if !silent { eprintln!("Invalid date '{}': {}. Use YYYY-MM-DD.", s, e); }
            None
        }
    }
}

fn parse_priority(s: &str, silent: bool) -> Option<Priority> {
    match s.parse::<Priority>() {
        Ok(p) => Some(p),
        Err(e) => {
            if !silent { eprintln!("Invalid priority: {}", e); }
            None
        }
    }
}

/// Adds a new task at the top of the list.
///
/// Priority defaults to medium; the deadline is optional.
pub fn cmd_add<S: KeyValueStore>(store: &mut TaskStore<S>, text: String, priority: Option<String>, deadline: Option<String>, silent: bool) {
    let priority = match priority {
        Some(p) => match parse_priority(&p, silent) {
            Some(p) => p,
            None => return,
        },
        None => Priority::default(),
    };
    let deadline = match deadline {
        Some(d) => match parse_date(&d, silent) {
            Some(d) => Some(d),
            None => return,
        },
        None => None,
    };

    match store.add(&text, priority, deadline) {
        Ok(task) => { if !silent { println!("Task added (id = {})", task.id); } }
        Err(e) => { if !silent { eprintln!("Cannot add task: {}", e); } }
    }
}

/// Flips a task between open and done.
pub fn cmd_toggle<S: KeyValueStore>(store: &mut TaskStore<S>, id: u64, silent: bool) {
    match store.toggle(id) {
        Ok(task) => {
            if !silent {
                if task.completed {
                    println!("🎉 Task {} completed. Nice work!", id);
                } else {
                    println!("Task {} reopened.", id);
                }
            }
        }
        Err(e) => { if !silent { eprintln!("{}", capitalize(&e.to_string())); } }
    }
}

/// Removes a task by ID.
pub fn cmd_remove<S: KeyValueStore>(store: &mut TaskStore<S>, id: u64, silent: bool) {
    match store.delete(id) {
        Ok(()) => { if !silent { println!("Task {} removed.", id); } }
        Err(e) => { if !silent { eprintln!("{}", capitalize(&e.to_string())); } }
    }
}

/// Replaces the text of a task.
pub fn cmd_edit<S: KeyValueStore>(store: &mut TaskStore<S>, id: u64, text: String, silent: bool) {
    match store.set_text(id, &text) {
        Ok(()) => { if !silent { println!("Task {} updated.", id); } }
        Err(e) => { if !silent { eprintln!("Cannot edit task {}: {}", id, e); } }
    }
}

pub fn cmd_priority<S: KeyValueStore>(store: &mut TaskStore<S>, id: u64, priority: String, silent: bool) {
    let Some(priority) = parse_priority(&priority, silent) else { return };
    match store.set_priority(id, priority) {
        Ok(()) => { if !silent { println!("Task {} priority set to {}.", id, priority); } }
        Err(e) => { if !silent { eprintln!("{}", capitalize(&e.to_string())); } }
    }
}

/// Sets or clears a task's deadline. `None` clears it.
pub fn cmd_deadline<S: KeyValueStore>(store: &mut TaskStore<S>, id: u64, date: Option<String>, silent: bool) {
    let deadline = match date {
        Some(d) => match parse_date(&d, silent) {
            Some(d) => Some(d),
            None => return,
        },
        None => None,
    };
    match store.set_deadline(id, deadline) {
        Ok(()) => {
            if !silent {
                match deadline {
                    Some(d) => println!("Task {} due on {}.", id, d),
                    None => println!("Task {} deadline cleared.", id),
                }
            }
        }
        Err(e) => { if !silent { eprintln!("{}", capitalize(&e.to_string())); } }
    }
}

pub fn cmd_notes<S: KeyValueStore>(store: &mut TaskStore<S>, id: u64, notes: String, silent: bool) {
    match store.set_notes(id, &notes) {
        Ok(()) => { if !silent { println!("Notes for task {} saved.", id); } }
        Err(e) => { if !silent { eprintln!("{}", capitalize(&e.to_string())); } }
    }
}

/// Swaps the positions of two tasks.
pub fn cmd_swap<S: KeyValueStore>(store: &mut TaskStore<S>, a: u64, b: u64, silent: bool) {
    match store.reorder(a, b) {
        Ok(()) => { if !silent { println!("Swapped tasks {} and {}.", a, b); } }
        Err(e) => { if !silent { eprintln!("{}", capitalize(&e.to_string())); } }
    }
}

/// Removes every completed task.
pub fn cmd_clear<S: KeyValueStore>(store: &mut TaskStore<S>, silent: bool) {
    let removed = store.clear_completed();
    if !silent { println!("Removed {} completed task(s).", removed); }
}

/// Lists tasks in a formatted table, in list order.
///
/// `filter` and `search` narrow the listing the same way the TUI does.
pub fn cmd_list<S: KeyValueStore>(store: &mut TaskStore<S>, filter: Option<String>, search: Option<String>) {
    if let Some(f) = filter {
        match f.parse::<Filter>() {
            Ok(f) => store.set_filter(f),
            Err(e) => {
                eprintln!("Invalid filter: {}", e);
                return;
            }
        }
    }
    if let Some(s) = search {
        store.set_search(&s);
    }

    let tasks = store.query();
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Task").add_attribute(Attribute::Bold),
            Cell::new("Priority").add_attribute(Attribute::Bold),
            Cell::new("Deadline").add_attribute(Attribute::Bold),
            Cell::new("Created").add_attribute(Attribute::Bold),
            Cell::new("Notes").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
        ]);

    let today = Local::now().date_naive();
    let now = Utc::now();

    for t in tasks {
        let status = DeadlineStatus::classify(t.deadline, today);
        let deadline_color = if t.completed {
            Color::Grey
        } else if status.is_pressing() {
            Color::Red
        } else if matches!(status, DeadlineStatus::Tomorrow | DeadlineStatus::Upcoming(_)) {
            Color::Yellow
        } else {
            Color::Reset
        };

        let (done, done_color) = if t.completed { ("Done", Color::Green) } else { ("Pending", Color::Yellow) };

        table.add_row(vec![
            Cell::new(t.id),
            Cell::new(&t.text),
            Cell::new(t.priority).fg(priority_color(t)),
            Cell::new(status.label()).fg(deadline_color),
            Cell::new(relative_age(t.created_at, now)),
            Cell::new(&t.notes),
            Cell::new(done).fg(done_color),
        ]);
    }

    println!("{table}");
}

fn priority_color(t: &Task) -> Color {
    if t.completed {
        return Color::Grey;
    }
    match t.priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
    }
}

/// Prints completion statistics.
pub fn cmd_stats<S: KeyValueStore>(store: &TaskStore<S>) {
    let stats = store.stats();
    println!("Total: {} | Completed: {} | Progress: {}%", stats.total, stats.completed, stats.percentage);
}

/// Writes the export document to `output`, or to the default export file
/// name in the current directory.
pub fn cmd_export<S: KeyValueStore>(store: &TaskStore<S>, output: Option<PathBuf>, silent: bool) {
    if store.tasks().is_empty() {
        if !silent { eprintln!("No tasks to export!"); }
        return;
    }
    let doc = store.export_snapshot();
    let path = output.unwrap_or_else(|| PathBuf::from(export_file_name(doc.export_date.date_naive())));
    if let Err(e) = fs::write(&path, doc.to_json()) {
        if !silent { eprintln!("Failed to write export '{}': {}", path.display(), e); }
    } else {
        if !silent { println!("Exported {} tasks to {}", doc.total_tasks, path.display()); }
    }
}

/// Merges the tasks from an export file into the list.
///
/// Asks for confirmation on stdin unless `force` is set.
pub fn cmd_import<S: KeyValueStore>(store: &mut TaskStore<S>, path: PathBuf, force: bool, silent: bool) {
    let stdin = io::stdin();
    cmd_import_with(store, path, force, silent, &mut stdin.lock(), &mut io::stdout());
}

/// [`cmd_import`] with the confirmation read from `input` and messages
/// written to `out`. Errors still go to stderr.
pub fn cmd_import_with<S, R, W>(store: &mut TaskStore<S>, path: PathBuf, force: bool, silent: bool, input: &mut R, out: &mut W)
where
    S: KeyValueStore,
    R: BufRead,
    W: Write,
{
    let content = match fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) => {
            if !silent { eprintln!("Error reading '{}': {}", path.display(), e); }
            return;
        }
    };
    let import = match ImportDocument::parse(&content) {
        Ok(doc) => doc,
        Err(e) => {
            if !silent { eprintln!("{}. Please use a file exported from TaskFlow.", capitalize(&e.to_string())); }
            return;
        }
    };

    let question = format!("Import {} tasks? This will add to your existing tasks.", import.len());
    if !force && !confirm(&question, input, out) {
        if !silent { let _ = writeln!(out, "Aborted."); }
        return;
    }

    let count = store.merge(import);
    if !silent { let _ = writeln!(out, "✅ Imported {} tasks successfully!", count); }
}

/// Prints a plain-text summary for sharing.
pub fn cmd_share<S: KeyValueStore>(store: &TaskStore<S>) {
    if store.tasks().is_empty() {
        eprintln!("No tasks to share!");
        return;
    }
    print!("{}", share_text(store.tasks(), Local::now()));
}

/// Shows the saved theme, or switches it. `"toggle"` flips it.
pub fn cmd_theme<S: KeyValueStore>(store: &mut TaskStore<S>, theme: Option<String>, silent: bool) {
    let current = load_theme(store.storage());
    let next = match theme.as_deref() {
        None => {
            println!("{}", current);
            return;
        }
        Some("toggle") => current.toggled(),
        Some(t) => match t.parse::<Theme>() {
            Ok(t) => t,
            Err(e) => {
                if !silent { eprintln!("{}", e); }
                return;
            }
        },
    };
    if let Err(e) = save_theme(store.storage_mut(), next) {
        if !silent { eprintln!("Failed to save theme: {}", e); }
    } else {
        if !silent { println!("Theme set to {}.", next); }
    }
}

fn confirm<R: BufRead, W: Write>(question: &str, input: &mut R, out: &mut W) -> bool {
    if write!(out, "{} [y/N] ", question).and_then(|_| out.flush()).is_err() {
        return false;
    }
    let mut answer = String::new();
    if input.read_line(&mut answer).is_err() {
        return false;
    }
    answer.trim().eq_ignore_ascii_case("y")
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
