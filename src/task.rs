//! Core task record and the value types the store operates on.
//!
//! # Invariants
//! - A `Task` accepted into the store has a non-empty `title`, a parsed
//!   `due_date`, and a `priority` in `[PRIORITY_MIN, PRIORITY_MAX]`.
//! - `id` is a process-local handle; it is never persisted and never shown
//!   to the user.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;

/// Lowest priority value (highest urgency by the default convention).
pub const PRIORITY_MIN: u8 = 1;
/// Highest priority value.
pub const PRIORITY_MAX: u8 = 5;

/// Wire/date-entry format for due dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Tasks due within this many days of the reference date count as due soon.
pub const DUE_SOON_WINDOW_DAYS: i64 = 3;

/// Stable identifier for a task within one process invocation.
///
/// Ordinals shown to the user shift whenever the collection is sorted or a
/// task is removed; mutations resolve an ordinal to a `TaskId` once and key
/// on the handle from then on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Create a fresh handle, unique within this process.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One trackable unit of work.
///
/// The five public fields are the persisted record; `id` is transient and
/// regenerated on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    #[serde(skip)]
    pub(crate) id: TaskId,
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
    pub priority: u8,
    pub completed: bool,
}

impl Task {
    /// The stable in-process handle for this task.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Classify this task's due date against a reference date.
    pub fn severity(&self, reference: NaiveDate) -> Severity {
        if self.due_date < reference {
            Severity::Overdue
        } else if (self.due_date - reference).num_days() <= DUE_SOON_WINDOW_DAYS {
            Severity::DueSoon
        } else {
            Severity::Normal
        }
    }
}

/// Due-date proximity relative to a reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Due date strictly before the reference date.
    Overdue,
    /// Due within `DUE_SOON_WINDOW_DAYS` days of the reference (inclusive).
    DueSoon,
    /// Far enough out that deadline reports omit it.
    Normal,
}

/// Key for one-shot reordering of the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Ascending, case-insensitive on title.
    Title,
    /// Ascending chronological on due date.
    DueDate,
    /// Ascending numeric on priority (1 sorts first).
    Priority,
    /// Incomplete tasks first, then case-insensitive title within each group.
    StatusThenTitle,
}

impl SortKey {
    /// Parse a user-facing key selector: the sort sub-menu number or a name.
    ///
    /// This is the one place free-form input becomes a typed key; anything
    /// unrecognized is `StoreError::InvalidKey`.
    pub fn parse(input: &str) -> Result<Self, StoreError> {
        match input.trim().to_ascii_lowercase().as_str() {
            "1" | "title" => Ok(Self::Title),
            "2" | "due-date" | "due_date" | "due date" => Ok(Self::DueDate),
            "3" | "priority" => Ok(Self::Priority),
            "4" | "status" => Ok(Self::StatusThenTitle),
            other => Err(StoreError::InvalidKey(other.to_string())),
        }
    }
}

/// Optional field overrides for a partial update.
///
/// `None` leaves the existing value unchanged. `due_date` stays textual
/// here: the store validates it (with the same rules as create) before any
/// field is applied.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub priority: Option<u8>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.priority.is_none()
    }
}

/// Validate a title: trimmed, non-empty.
pub(crate) fn validate_title(raw: &str) -> Result<String, StoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(StoreError::validation("title", "title cannot be empty"));
    }
    Ok(trimmed.to_string())
}

/// Parse a due date in `YYYY-MM-DD` form.
pub(crate) fn parse_due_date(raw: &str) -> Result<NaiveDate, StoreError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| {
        StoreError::validation(
            "due_date",
            format!("'{}' is not a valid YYYY-MM-DD date", raw.trim()),
        )
    })
}

/// Check a priority against the `[PRIORITY_MIN, PRIORITY_MAX]` range.
pub(crate) fn validate_priority(priority: u8) -> Result<u8, StoreError> {
    if (PRIORITY_MIN..=PRIORITY_MAX).contains(&priority) {
        Ok(priority)
    } else {
        Err(StoreError::validation(
            "priority",
            format!(
                "priority must be between {} and {}, got {}",
                PRIORITY_MIN, PRIORITY_MAX, priority
            ),
        ))
    }
}
