//! # tasktrack
//!
//! Single-user, interactive command-line task tracker with JSON persistence.
//!
//! The invariant-bearing core is the [`store::TaskStore`]: an ordered,
//! exclusively-owned collection of tasks plus the operations that validate,
//! mutate, query, and persist it. The [`shell::Shell`] is presentation glue:
//! it prompts, dispatches to the store, and renders text, and never touches
//! the collection directly.
//!
//! ## Modules
//! - `task`: the task record, stable handles, severity and sort-key types
//! - `store`: CRUD, search, deadline checks, sorting, save/load
//! - `shell`: the numbered-menu interaction loop
//! - `config`: environment-driven configuration
//! - `error`: the recoverable store error kinds

pub mod config;
pub mod error;
pub mod shell;
pub mod store;
pub mod task;

pub use config::Config;
pub use error::StoreError;
pub use shell::Shell;
pub use store::{LoadOutcome, TaskStore};
pub use task::{Severity, SortKey, Task, TaskId, TaskPatch};
