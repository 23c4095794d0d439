use std::fmt::Write;

use chrono::{DateTime, Local};

use crate::models::Task;

const RULE_WIDTH: usize = 40;

/// Builds a plain-text summary of the list suitable for pasting elsewhere.
///
/// Active tasks come first, then completed ones, each numbered from 1 in
/// collection order.
pub fn share_text(tasks: &[Task], at: DateTime<Local>) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let active: Vec<&Task> = tasks.iter().filter(|t| !t.completed).collect();
    let completed: Vec<&Task> = tasks.iter().filter(|t| t.completed).collect();

    let mut out = String::new();
    // Writing into a String never fails.
    let _ = writeln!(out, "📋 TaskFlow - My Tasks");
    let _ = writeln!(out, "{}\n", rule);

    let _ = writeln!(out, "📝 Active Tasks:");
    write_numbered(&mut out, &active, "No active tasks");

    let _ = writeln!(out, "\n✅ Completed Tasks:");
    write_numbered(&mut out, &completed, "No completed tasks");

    let _ = writeln!(out, "\n{}", rule);
    let _ = writeln!(out, "📊 Progress: {}/{} tasks completed", completed.len(), tasks.len());
    let _ = writeln!(out, "📅 Exported: {}", at.format("%Y-%m-%d %H:%M"));
    out
}

fn write_numbered(out: &mut String, tasks: &[&Task], empty: &str) {
    if tasks.is_empty() {
        let _ = writeln!(out, "{}", empty);
        return;
    }
    for (idx, task) in tasks.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", idx + 1, task.text);
    }
}
