//! Export and import documents.
//!
//! An export is the full collection wrapped with metadata. An import accepts
//! any JSON object carrying a `tasks` array; every other top-level field is
//! ignored and individual records are read leniently.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::{Result, TaskError};
use crate::models::{iso_millis, Priority, Task};

/// Version tag written into every export.
pub const EXPORT_VERSION: &str = "1.0";

/// The document produced by an export.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    #[serde(with = "iso_millis")]
    pub export_date: DateTime<Utc>,
    pub version: String,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub tasks: Vec<Task>,
}

impl ExportDocument {
    pub fn new(tasks: &[Task], now: DateTime<Utc>) -> Self {
        Self {
            export_date: now,
            version: EXPORT_VERSION.to_string(),
            total_tasks: tasks.len(),
            completed_tasks: tasks.iter().filter(|t| t.completed).count(),
            tasks: tasks.to_vec(),
        }
    }

    /// Pretty-printed JSON with two-space indentation.
    pub fn to_json(&self) -> String {
        // Serializing plain data with string keys cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Suggested file name for an export taken on `date`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("taskflow_export_{}.json", date.format("%Y-%m-%d"))
}

/// A task record as found in an import document.
///
/// Every field is optional; missing ones are filled in when the record is
/// turned into a [`Task`].
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportedTask {
    pub id: Option<u64>,
    pub text: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<String>,
    pub deadline: Option<String>,
    pub created_at: Option<String>,
    pub notes: Option<String>,
}

impl ImportedTask {
    /// Builds a task, using `fresh_id` when the record carries no id and
    /// `now` when it has no usable creation time.
    pub fn into_task(self, fresh_id: impl FnOnce() -> u64, now: DateTime<Utc>) -> Task {
        let priority = match self.priority.as_deref() {
            None => Priority::default(),
            Some(p) => p.parse().unwrap_or_else(|e: String| {
                warn!(error = %e, "Imported task has an unknown priority, using medium");
                Priority::default()
            }),
        };
        let deadline = self.deadline.as_deref().filter(|d| !d.is_empty()).and_then(|d| {
            NaiveDate::parse_from_str(d, "%Y-%m-%d")
                .map_err(|e| warn!(deadline = d, error = %e, "Dropping unparseable imported deadline"))
                .ok()
        });
        let created_at = self
            .created_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or(now);
        Task {
            id: self.id.unwrap_or_else(fresh_id),
            text: self.text.unwrap_or_default(),
            completed: self.completed.unwrap_or(false),
            priority,
            deadline,
            created_at,
            notes: self.notes.unwrap_or_default(),
        }
    }
}

/// A validated import, ready to be merged into a store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportDocument {
    pub tasks: Vec<ImportedTask>,
}

impl ImportDocument {
    /// Parses and validates an import document.
    ///
    /// Fails with [`TaskError::InvalidFormat`] when the text is not JSON, has
    /// no `tasks` array, or contains a record that is not a task-shaped
    /// object. Nothing is partially accepted.
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| TaskError::InvalidFormat(format!("not valid JSON: {}", e)))?;
        let records = value
            .get("tasks")
            .and_then(Value::as_array)
            .ok_or_else(|| TaskError::InvalidFormat("missing `tasks` array".to_string()))?;

        let tasks = records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                if !record.is_object() {
                    return Err(TaskError::InvalidFormat(format!("task #{} is not an object", i + 1)));
                }
                ImportedTask::deserialize(record).map_err(|e| TaskError::InvalidFormat(format!("task #{}: {}", i + 1, e)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { tasks })
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
