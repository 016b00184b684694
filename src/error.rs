//! Error types for the task record store.
//!
//! Every error here is recoverable at the shell boundary: the shell reports
//! it and returns to the menu. No store operation leaves the collection
//! partially mutated after a failure.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A field value failed validation on create or update.
    #[error("invalid {field}: {reason}")]
    Validation {
        field: &'static str,
        reason: String,
    },

    /// A 1-based ordinal fell outside the current collection.
    #[error("no task at position {ordinal} (there are {len} tasks)")]
    Index { ordinal: usize, len: usize },

    /// A sort key selector that is not one of the four known keys.
    #[error("unrecognized sort key: {0}")]
    InvalidKey(String),

    /// The persisted file exists but its contents are not a valid task list.
    #[error("corrupt task data: {0}")]
    Parse(#[source] serde_json::Error),

    /// Reading or writing the persisted file failed for reasons unrelated
    /// to its contents.
    #[error("task file I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}
