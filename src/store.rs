//! In-memory task collection with JSON persistence.
//!
//! The store owns the ordered collection and is the only place its
//! invariants are enforced. It does no terminal I/O; the shell renders
//! whatever the store returns. Persistence is a single pretty-printed JSON
//! file, written whole on save and read whole on load.
//!
//! Users address tasks by 1-based ordinal. Internally every mutation
//! resolves the ordinal to the task's stable [`TaskId`] first and then
//! operates through the handle, so a reorder between resolution and write
//! cannot silently retarget the operation.

use std::path::Path;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::task::{
    parse_due_date, validate_priority, validate_title, Severity, SortKey, Task, TaskId, TaskPatch,
};

/// What `load` found at the source path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The file existed and parsed; the collection now holds this many tasks.
    Loaded(usize),
    /// No file at the path; the collection was reset to empty. This is the
    /// normal first-run state, not an error.
    StartedEmpty,
}

/// The task record store.
///
/// Exclusively owned by one process invocation; every operation runs to
/// completion before the next, and each is atomic with respect to the
/// collection (fully applied or not applied at all).
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks currently held.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Validate the fields and append a new task to the end of the
    /// collection. New tasks always start incomplete.
    pub fn create(
        &mut self,
        title: &str,
        description: &str,
        due_date: &str,
        priority: u8,
    ) -> Result<&Task, StoreError> {
        let title = validate_title(title)?;
        let due_date = parse_due_date(due_date)?;
        let priority = validate_priority(priority)?;

        let task = Task {
            id: TaskId::new(),
            title,
            description: description.trim().to_string(),
            due_date,
            priority,
            completed: false,
        };
        debug!(title = %task.title, due = %task.due_date, "task created");
        self.tasks.push(task);
        Ok(self.tasks.last().expect("just pushed"))
    }

    /// The current in-memory order; a task's 1-based ordinal is its
    /// position here.
    pub fn list(&self) -> &[Task] {
        &self.tasks
    }

    /// Read the task at a 1-based ordinal.
    pub fn get(&self, ordinal: usize) -> Result<&Task, StoreError> {
        let id = self.id_at(ordinal)?;
        Ok(self.by_id(id))
    }

    /// Delete the task at a 1-based ordinal and return it. Ordinals of the
    /// tasks after it shift down by one.
    pub fn remove(&mut self, ordinal: usize) -> Result<Task, StoreError> {
        let id = self.id_at(ordinal)?;
        let index = self.index_of(id);
        let task = self.tasks.remove(index);
        debug!(title = %task.title, ordinal, "task removed");
        Ok(task)
    }

    /// Apply a partial update to the task at a 1-based ordinal.
    ///
    /// Every supplied field is validated with the same rules as `create`
    /// before any field is written; an invalid patch leaves the task
    /// entirely unmodified.
    pub fn update(&mut self, ordinal: usize, patch: TaskPatch) -> Result<&Task, StoreError> {
        let id = self.id_at(ordinal)?;

        let title = patch.title.as_deref().map(validate_title).transpose()?;
        let due_date = patch.due_date.as_deref().map(parse_due_date).transpose()?;
        let priority = patch.priority.map(validate_priority).transpose()?;

        let index = self.index_of(id);
        let task = &mut self.tasks[index];
        if let Some(title) = title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = description.trim().to_string();
        }
        if let Some(due_date) = due_date {
            task.due_date = due_date;
        }
        if let Some(priority) = priority {
            task.priority = priority;
        }
        debug!(title = %task.title, ordinal, "task updated");
        Ok(&self.tasks[index])
    }

    /// Mark the task at a 1-based ordinal as completed. Marking an
    /// already-completed task is a no-op, not an error.
    pub fn mark_completed(&mut self, ordinal: usize) -> Result<&Task, StoreError> {
        let id = self.id_at(ordinal)?;
        let index = self.index_of(id);
        self.tasks[index].completed = true;
        debug!(title = %self.tasks[index].title, ordinal, "task completed");
        Ok(&self.tasks[index])
    }

    /// Case-insensitive substring search over title and description,
    /// preserving collection order among matches. An empty term matches
    /// nothing; rejecting empty input is the caller's job.
    pub fn search(&self, term: &str) -> Vec<&Task> {
        if term.is_empty() {
            return Vec::new();
        }
        let needle = term.to_lowercase();
        self.tasks
            .iter()
            .filter(|t| {
                t.title.to_lowercase().contains(&needle)
                    || t.description.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Report every overdue or due-soon task relative to a reference date,
    /// in collection order. Completed tasks are still reported; this is a
    /// pure query and filters nothing but `Normal` severity.
    pub fn check_deadlines(&self, reference: NaiveDate) -> Vec<(&Task, Severity)> {
        self.tasks
            .iter()
            .filter_map(|t| match t.severity(reference) {
                Severity::Normal => None,
                severity => Some((t, severity)),
            })
            .collect()
    }

    /// Reorder the collection in place. One-shot: later inserts append at
    /// the end regardless of this ordering. Stable for ties.
    pub fn sort(&mut self, key: SortKey) {
        match key {
            SortKey::Title => self.tasks.sort_by_key(|t| t.title.to_lowercase()),
            SortKey::DueDate => self.tasks.sort_by_key(|t| t.due_date),
            SortKey::Priority => self.tasks.sort_by_key(|t| t.priority),
            SortKey::StatusThenTitle => self
                .tasks
                .sort_by_key(|t| (t.completed, t.title.to_lowercase())),
        }
        debug!(?key, "collection sorted");
    }

    /// Write the full collection, in current order, to `path` as
    /// pretty-printed JSON. All-or-nothing: the destination's previous
    /// contents are replaced entirely.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let contents = serde_json::to_string_pretty(&self.tasks).map_err(StoreError::Parse)?;
        std::fs::write(path, contents)?;
        info!(path = %path.display(), count = self.tasks.len(), "tasks saved");
        Ok(())
    }

    /// Replace the in-memory collection with the contents of `path`.
    ///
    /// A missing file is the expected first-run state: the store resets to
    /// empty and reports [`LoadOutcome::StartedEmpty`]. A present but
    /// corrupt file fails with `Parse` and also resets the store to empty;
    /// corrupt data is never partially loaded. Any other read failure fails
    /// with `Io` and leaves the current collection unchanged.
    pub fn load(&mut self, path: &Path) -> Result<LoadOutcome, StoreError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no task file found, starting empty");
                self.tasks.clear();
                return Ok(LoadOutcome::StartedEmpty);
            }
            Err(e) => return Err(StoreError::Io(e)),
        };
        match serde_json::from_str::<Vec<Task>>(&contents) {
            Ok(tasks) => {
                let count = tasks.len();
                self.tasks = tasks;
                info!(path = %path.display(), count, "tasks loaded");
                Ok(LoadOutcome::Loaded(count))
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "task file corrupt, resetting to empty");
                self.tasks.clear();
                Err(StoreError::Parse(e))
            }
        }
    }

    /// Translate a user-facing 1-based ordinal into a stable handle.
    fn id_at(&self, ordinal: usize) -> Result<TaskId, StoreError> {
        if ordinal == 0 || ordinal > self.tasks.len() {
            return Err(StoreError::Index {
                ordinal,
                len: self.tasks.len(),
            });
        }
        Ok(self.tasks[ordinal - 1].id)
    }

    /// Current position of a handle the store just resolved.
    fn index_of(&self, id: TaskId) -> usize {
        // id_at returned this id from the live collection, so it is present.
        self.tasks
            .iter()
            .position(|t| t.id == id)
            .expect("resolved handle belongs to the collection")
    }

    fn by_id(&self, id: TaskId) -> &Task {
        &self.tasks[self.index_of(id)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(titles: &[(&str, &str, u8)]) -> TaskStore {
        let mut store = TaskStore::new();
        for (title, due, priority) in titles {
            store.create(title, "", due, *priority).unwrap();
        }
        store
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_create_appends_incomplete_task() {
        let mut store = TaskStore::new();
        store
            .create("Write report", "quarterly numbers", "2026-09-01", 2)
            .unwrap();
        let task = store.get(1).unwrap();
        assert_eq!(task.title, "Write report");
        assert_eq!(task.description, "quarterly numbers");
        assert_eq!(task.due_date, date("2026-09-01"));
        assert_eq!(task.priority, 2);
        assert!(!task.completed);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_create_trims_title() {
        let mut store = TaskStore::new();
        store.create("  padded  ", "", "2026-01-01", 3).unwrap();
        assert_eq!(store.get(1).unwrap().title, "padded");
    }

    #[test]
    fn test_create_rejects_bad_fields() {
        let mut store = TaskStore::new();
        assert!(matches!(
            store.create("", "", "2026-01-01", 3),
            Err(StoreError::Validation { field: "title", .. })
        ));
        assert!(matches!(
            store.create("t", "", "not-a-date", 3),
            Err(StoreError::Validation {
                field: "due_date",
                ..
            })
        ));
        assert!(matches!(
            store.create("t", "", "2026-01-01", 9),
            Err(StoreError::Validation {
                field: "priority",
                ..
            })
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_shifts_ordinals() {
        let mut store = store_with(&[
            ("first", "2026-01-01", 1),
            ("second", "2026-01-02", 2),
            ("third", "2026-01-03", 3),
        ]);
        let removed = store.remove(2).unwrap();
        assert_eq!(removed.title, "second");
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(1).unwrap().title, "first");
        assert_eq!(store.get(2).unwrap().title, "third");
    }

    #[test]
    fn test_ordinal_bounds() {
        let mut store = store_with(&[("only", "2026-01-01", 1)]);
        for ordinal in [0, 2, 100] {
            assert!(matches!(
                store.get(ordinal),
                Err(StoreError::Index { len: 1, .. })
            ));
        }
        assert!(store.remove(0).is_err());
        assert!(store.mark_completed(2).is_err());
        assert!(store.update(2, TaskPatch::default()).is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_update_empty_patch_is_noop() {
        let mut store = store_with(&[("keep", "2026-05-05", 4)]);
        store.update(1, TaskPatch::default()).unwrap();
        let task = store.get(1).unwrap();
        assert_eq!(task.title, "keep");
        assert_eq!(task.due_date, date("2026-05-05"));
        assert_eq!(task.priority, 4);
        assert!(!task.completed);
    }

    #[test]
    fn test_update_partial_fields() {
        let mut store = store_with(&[("old", "2026-05-05", 4)]);
        store
            .update(
                1,
                TaskPatch {
                    title: Some("new".into()),
                    priority: Some(1),
                    ..Default::default()
                },
            )
            .unwrap();
        let task = store.get(1).unwrap();
        assert_eq!(task.title, "new");
        assert_eq!(task.priority, 1);
        assert_eq!(task.due_date, date("2026-05-05"));
    }

    #[test]
    fn test_update_invalid_field_leaves_all_unchanged() {
        let mut store = store_with(&[("old", "2026-05-05", 4)]);
        let err = store
            .update(
                1,
                TaskPatch {
                    title: Some("would be valid".into()),
                    due_date: Some("2026-13-01".into()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Validation {
                field: "due_date",
                ..
            }
        ));
        let task = store.get(1).unwrap();
        assert_eq!(task.title, "old");
        assert_eq!(task.due_date, date("2026-05-05"));
    }

    #[test]
    fn test_mark_completed_idempotent() {
        let mut store = store_with(&[("done twice", "2026-01-01", 1)]);
        assert!(store.mark_completed(1).unwrap().completed);
        assert!(store.mark_completed(1).unwrap().completed);
    }

    #[test]
    fn test_search_matches_title_and_description() {
        let mut store = TaskStore::new();
        store
            .create("Buy groceries", "milk and eggs", "2026-01-01", 3)
            .unwrap();
        store
            .create("Call plumber", "kitchen sink leaks", "2026-01-02", 1)
            .unwrap();
        store
            .create("Groceries run", "", "2026-01-03", 2)
            .unwrap();

        let matches = store.search("GROCER");
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].title, "Buy groceries");
        assert_eq!(matches[1].title, "Groceries run");

        let matches = store.search("sink");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].title, "Call plumber");
    }

    #[test]
    fn test_search_empty_term_matches_nothing() {
        let store = store_with(&[("anything", "2026-01-01", 1)]);
        assert!(store.search("").is_empty());
    }

    #[test]
    fn test_check_deadlines_severities() {
        let reference = date("2026-08-24");
        let mut store = store_with(&[
            ("yesterday", "2026-08-23", 1),
            ("in two days", "2026-08-26", 1),
            ("in ten days", "2026-09-03", 1),
        ]);
        store.mark_completed(1).unwrap();

        let report = store.check_deadlines(reference);
        assert_eq!(report.len(), 2);
        assert_eq!(report[0].0.title, "yesterday");
        assert_eq!(report[0].1, Severity::Overdue);
        assert_eq!(report[1].0.title, "in two days");
        assert_eq!(report[1].1, Severity::DueSoon);
    }

    #[test]
    fn test_sort_title_case_insensitive() {
        let mut store = store_with(&[
            ("Banana", "2026-01-01", 1),
            ("apple", "2026-01-01", 1),
            ("Cherry", "2026-01-01", 1),
        ]);
        store.sort(SortKey::Title);
        let titles: Vec<_> = store.list().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["apple", "Banana", "Cherry"]);
    }

    #[test]
    fn test_sort_due_date_and_priority() {
        let mut store = store_with(&[
            ("late", "2026-03-01", 5),
            ("early", "2026-01-01", 2),
            ("middle", "2026-02-01", 1),
        ]);
        store.sort(SortKey::DueDate);
        let titles: Vec<_> = store.list().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["early", "middle", "late"]);

        store.sort(SortKey::Priority);
        let titles: Vec<_> = store.list().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["middle", "early", "late"]);
    }

    #[test]
    fn test_sort_status_then_title() {
        let mut store = store_with(&[("B", "2026-01-01", 1), ("A", "2026-01-01", 1)]);
        store.mark_completed(1).unwrap();
        store.sort(SortKey::StatusThenTitle);
        let tasks = store.list();
        assert_eq!(tasks[0].title, "A");
        assert!(!tasks[0].completed);
        assert_eq!(tasks[1].title, "B");
        assert!(tasks[1].completed);
    }

    #[test]
    fn test_sort_is_one_shot() {
        let mut store = store_with(&[("b", "2026-01-01", 1), ("a", "2026-01-01", 1)]);
        store.sort(SortKey::Title);
        store.create("0 appended", "", "2026-01-01", 1).unwrap();
        assert_eq!(store.get(3).unwrap().title, "0 appended");
    }
}
