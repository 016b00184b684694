//! Configuration for tasktrack.
//!
//! Configuration can be set via environment variables:
//! - `TASKTRACK_FILE` - Optional. Path of the persisted task file. Defaults
//!   to `tasks.json` in the current directory.

use std::path::PathBuf;

/// Default persistence path, relative to the working directory.
pub const DEFAULT_TASKS_FILE: &str = "tasks.json";

#[derive(Debug, Clone)]
pub struct Config {
    /// Where tasks are saved and loaded.
    pub tasks_file: PathBuf,
}

impl Config {
    /// Load configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let tasks_file = std::env::var("TASKTRACK_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_TASKS_FILE));
        Self { tasks_file }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tasks_file: PathBuf::from(DEFAULT_TASKS_FILE),
        }
    }
}
