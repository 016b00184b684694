//! Interactive menu shell.
//!
//! Thin presentation layer over [`TaskStore`]: prompts a human for input,
//! dispatches to store operations, and renders results as text. All
//! validation retry loops live here; the store only ever sees input the
//! shell has already shaped (though store errors are still reported, never
//! fatal). Generic over the reader and writer so tests can script a whole
//! session.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use tracing::warn;

use crate::store::{LoadOutcome, TaskStore};
use crate::task::{Severity, SortKey, Task, TaskPatch, PRIORITY_MAX, PRIORITY_MIN};

const MENU: &str = "\n--- Task Tracker Menu ---\n\
1. Add Task\n\
2. List Tasks\n\
3. Remove Task\n\
4. Update Task\n\
5. Search Tasks\n\
6. Mark Task as Completed\n\
7. Check Deadlines\n\
8. Sort Tasks\n\
9. Save Tasks\n\
10. Load Tasks\n\
11. Exit";

const DESCRIPTION_PREVIEW_CHARS: usize = 25;

pub struct Shell<R, W> {
    store: TaskStore,
    tasks_file: PathBuf,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(store: TaskStore, tasks_file: PathBuf, input: R, output: W) -> Self {
        Self {
            store,
            tasks_file,
            input,
            output,
        }
    }

    /// The store this shell drives. Used by tests to inspect session state.
    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    /// Run the menu loop until Exit or end of input. Exit saves first.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            writeln!(self.output, "{}", MENU)?;
            let choice = match self.prompt("Enter your choice: ")? {
                Some(line) => line,
                None => {
                    // End of input counts as Exit.
                    self.save_on_exit()?;
                    break;
                }
            };
            match choice.parse::<u32>() {
                Ok(1) => self.add_task()?,
                Ok(2) => self.list_tasks()?,
                Ok(3) => self.remove_task()?,
                Ok(4) => self.update_task()?,
                Ok(5) => self.search_tasks()?,
                Ok(6) => self.mark_completed()?,
                Ok(7) => self.check_deadlines()?,
                Ok(8) => self.sort_tasks()?,
                Ok(9) => self.save_tasks()?,
                Ok(10) => self.load_tasks()?,
                Ok(11) => {
                    self.save_on_exit()?;
                    writeln!(self.output, "Exiting task tracker. Goodbye!")?;
                    break;
                }
                _ => writeln!(self.output, "Error: invalid choice, please try again.")?,
            }
        }
        Ok(())
    }

    fn add_task(&mut self) -> io::Result<()> {
        let title = match self.prompt_nonempty("Enter task title: ")? {
            Some(title) => title,
            None => return Ok(()),
        };
        let description = self.prompt("Enter task description: ")?.unwrap_or_default();
        let due_date = match self.prompt_date("Enter task due date (YYYY-MM-DD): ")? {
            Some(date) => date,
            None => return Ok(()),
        };
        let priority = match self.prompt_priority()? {
            Some(priority) => priority,
            None => return Ok(()),
        };

        match self.store.create(&title, &description, &due_date, priority) {
            Ok(_) => writeln!(self.output, "Task added successfully!"),
            Err(e) => writeln!(self.output, "Error: {}", e),
        }
    }

    fn list_tasks(&mut self) -> io::Result<()> {
        if self.store.is_empty() {
            return writeln!(self.output, "No tasks available.");
        }
        let rows: Vec<String> = self
            .store
            .list()
            .iter()
            .enumerate()
            .map(|(i, task)| render_row(i + 1, task))
            .collect();
        self.render_table(&rows)
    }

    fn remove_task(&mut self) -> io::Result<()> {
        self.list_tasks()?;
        if self.store.is_empty() {
            return Ok(());
        }
        let ordinal = match self.prompt_ordinal("Enter the task number to remove: ")? {
            Some(ordinal) => ordinal,
            None => return Ok(()),
        };
        match self.store.remove(ordinal) {
            Ok(task) => writeln!(self.output, "Task '{}' removed successfully.", task.title),
            Err(e) => writeln!(self.output, "Error: {}", e),
        }
    }

    fn update_task(&mut self) -> io::Result<()> {
        self.list_tasks()?;
        if self.store.is_empty() {
            return Ok(());
        }
        let ordinal = match self.prompt_ordinal("Enter the task number to update: ")? {
            Some(ordinal) => ordinal,
            None => return Ok(()),
        };
        let (title, description, due_date, priority) = match self.store.get(ordinal) {
            Ok(task) => (
                task.title.clone(),
                task.description.clone(),
                task.due_date,
                task.priority,
            ),
            Err(e) => return writeln!(self.output, "Error: {}", e),
        };

        writeln!(self.output, "Updating task '{}'.", title)?;
        writeln!(self.output, "Leave a field empty to keep its current value.")?;

        let mut patch = TaskPatch::default();
        if let Some(line) = self.prompt(&format!("Enter new title (current: {}): ", title))? {
            if !line.is_empty() {
                patch.title = Some(line);
            }
        }
        if let Some(line) =
            self.prompt(&format!("Enter new description (current: {}): ", description))?
        {
            if !line.is_empty() {
                patch.description = Some(line);
            }
        }
        loop {
            let line = match self.prompt(&format!(
                "Enter new due date (YYYY-MM-DD, current: {}): ",
                due_date
            ))? {
                Some(line) => line,
                None => return Ok(()),
            };
            if line.is_empty() {
                break;
            }
            if chrono::NaiveDate::parse_from_str(&line, crate::task::DATE_FORMAT).is_ok() {
                patch.due_date = Some(line);
                break;
            }
            writeln!(self.output, "Error: invalid date format, please use YYYY-MM-DD.")?;
        }
        loop {
            let line = match self.prompt(&format!(
                "Enter new priority ({}-{}, current: {}): ",
                PRIORITY_MIN, PRIORITY_MAX, priority
            ))? {
                Some(line) => line,
                None => return Ok(()),
            };
            if line.is_empty() {
                break;
            }
            match line.parse::<u8>() {
                Ok(p) if (PRIORITY_MIN..=PRIORITY_MAX).contains(&p) => {
                    patch.priority = Some(p);
                    break;
                }
                _ => writeln!(
                    self.output,
                    "Error: priority must be a number between {} and {}.",
                    PRIORITY_MIN, PRIORITY_MAX
                )?,
            }
        }

        match self.store.update(ordinal, patch) {
            Ok(task) => writeln!(self.output, "Task '{}' updated successfully.", task.title),
            Err(e) => writeln!(self.output, "Error: {}", e),
        }
    }

    fn search_tasks(&mut self) -> io::Result<()> {
        let term = match self.prompt("Enter keyword to search for (title or description): ")? {
            Some(term) => term,
            None => return Ok(()),
        };
        if term.is_empty() {
            return writeln!(self.output, "Search term cannot be empty.");
        }
        let matches = self.store.search(&term);
        if matches.is_empty() {
            return writeln!(self.output, "No tasks found matching '{}'.", term);
        }
        writeln!(self.output, "\n--- Found Tasks ---")?;
        let rows: Vec<String> = matches
            .iter()
            .enumerate()
            .map(|(i, task)| render_row(i + 1, task))
            .collect();
        self.render_table(&rows)
    }

    fn mark_completed(&mut self) -> io::Result<()> {
        self.list_tasks()?;
        if self.store.is_empty() {
            return Ok(());
        }
        let ordinal = match self.prompt_ordinal("Enter the task number to mark as completed: ")? {
            Some(ordinal) => ordinal,
            None => return Ok(()),
        };
        match self.store.mark_completed(ordinal) {
            Ok(task) => writeln!(self.output, "Task '{}' marked as completed.", task.title),
            Err(e) => writeln!(self.output, "Error: {}", e),
        }
    }

    fn check_deadlines(&mut self) -> io::Result<()> {
        let today = chrono::Local::now().date_naive();
        writeln!(self.output, "\nTask deadlines:")?;
        for (task, severity) in self.store.check_deadlines(today) {
            let marker = match severity {
                Severity::Overdue => "[OVERDUE] ",
                Severity::DueSoon => "[DUE SOON]",
                Severity::Normal => continue,
            };
            writeln!(
                self.output,
                "{} {} (Due: {})",
                marker, task.title, task.due_date
            )?;
        }
        writeln!(self.output)
    }

    fn sort_tasks(&mut self) -> io::Result<()> {
        if self.store.is_empty() {
            return writeln!(self.output, "No tasks to sort.");
        }
        writeln!(
            self.output,
            "\nSort tasks by:\n1. Title\n2. Due Date\n3. Priority\n4. Status"
        )?;
        let choice = match self.prompt("Enter your choice: ")? {
            Some(choice) => choice,
            None => return Ok(()),
        };
        match SortKey::parse(&choice) {
            Ok(key) => {
                self.store.sort(key);
                writeln!(self.output, "Tasks sorted.")
            }
            Err(e) => writeln!(self.output, "Error: {}. Sorting canceled.", e),
        }
    }

    fn save_tasks(&mut self) -> io::Result<()> {
        match self.store.save(&self.tasks_file) {
            Ok(()) => writeln!(
                self.output,
                "Tasks saved to {}.",
                self.tasks_file.display()
            ),
            Err(e) => writeln!(self.output, "Error: {}", e),
        }
    }

    fn load_tasks(&mut self) -> io::Result<()> {
        match self.store.load(&self.tasks_file) {
            Ok(LoadOutcome::Loaded(count)) => writeln!(
                self.output,
                "Loaded {} tasks from {}.",
                count,
                self.tasks_file.display()
            ),
            Ok(LoadOutcome::StartedEmpty) => writeln!(
                self.output,
                "No save file at {}. Starting with an empty task list.",
                self.tasks_file.display()
            ),
            Err(e) => writeln!(self.output, "Error: {}", e),
        }
    }

    fn save_on_exit(&mut self) -> io::Result<()> {
        if let Err(e) = self.store.save(&self.tasks_file) {
            warn!(error = %e, "save on exit failed");
            writeln!(self.output, "Error: {}", e)?;
        } else {
            writeln!(self.output, "Tasks saved to {}.", self.tasks_file.display())?;
        }
        Ok(())
    }

    /// Write a prompt, read one line, and return it trimmed. `None` means
    /// the input stream is exhausted.
    fn prompt(&mut self, message: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", message)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn prompt_nonempty(&mut self, message: &str) -> io::Result<Option<String>> {
        loop {
            match self.prompt(message)? {
                Some(line) if !line.is_empty() => return Ok(Some(line)),
                Some(_) => writeln!(self.output, "Error: this field cannot be empty.")?,
                None => return Ok(None),
            }
        }
    }

    fn prompt_date(&mut self, message: &str) -> io::Result<Option<String>> {
        loop {
            match self.prompt(message)? {
                Some(line)
                    if chrono::NaiveDate::parse_from_str(&line, crate::task::DATE_FORMAT)
                        .is_ok() =>
                {
                    return Ok(Some(line))
                }
                Some(_) => {
                    writeln!(self.output, "Error: invalid date format, please use YYYY-MM-DD.")?
                }
                None => return Ok(None),
            }
        }
    }

    fn prompt_priority(&mut self) -> io::Result<Option<u8>> {
        let message = format!("Enter task priority ({}-{}): ", PRIORITY_MIN, PRIORITY_MAX);
        loop {
            match self.prompt(&message)? {
                Some(line) => match line.parse::<u8>() {
                    Ok(p) if (PRIORITY_MIN..=PRIORITY_MAX).contains(&p) => return Ok(Some(p)),
                    _ => writeln!(
                        self.output,
                        "Error: priority must be a number between {} and {}.",
                        PRIORITY_MIN, PRIORITY_MAX
                    )?,
                },
                None => return Ok(None),
            }
        }
    }

    fn prompt_ordinal(&mut self, message: &str) -> io::Result<Option<usize>> {
        loop {
            match self.prompt(message)? {
                Some(line) => match line.parse::<usize>() {
                    Ok(ordinal) => return Ok(Some(ordinal)),
                    Err(_) => writeln!(self.output, "Error: please enter a valid number.")?,
                },
                None => return Ok(None),
            }
        }
    }

    fn render_table(&mut self, rows: &[String]) -> io::Result<()> {
        writeln!(
            self.output,
            "{:<6} {:<20} {:<12} {:<8} {:<10} {:<30}",
            "Index", "Title", "Due Date", "Priority", "Status", "Description (partial)"
        )?;
        writeln!(self.output, "{}", "=".repeat(90))?;
        for row in rows {
            writeln!(self.output, "{}", row)?;
        }
        Ok(())
    }
}

fn render_row(ordinal: usize, task: &Task) -> String {
    let status = if task.completed { "Completed" } else { "Pending" };
    format!(
        "{:<6} {:<20} {:<12} {:<8} {:<10} {:<30}",
        ordinal,
        task.title,
        task.due_date.to_string(),
        task.priority,
        status,
        preview(&task.description)
    )
}

/// Truncate a description for the listing table. Character-counted so
/// multi-byte text never splits.
fn preview(description: &str) -> String {
    if description.chars().count() > DESCRIPTION_PREVIEW_CHARS {
        let head: String = description.chars().take(DESCRIPTION_PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        description.to_string()
    }
}
