//! tasktrack - interactive task tracker entry point.

use std::io::Write;

use tasktrack::{Config, LoadOutcome, Shell, TaskStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Initialize logging; keep the default quiet so log lines do not
    // interleave with menu output.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tasktrack=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env();

    let stdout = std::io::stdout();
    let stdin = std::io::stdin();

    let mut store = TaskStore::new();
    match store.load(&config.tasks_file) {
        Ok(LoadOutcome::Loaded(count)) => {
            writeln!(
                stdout.lock(),
                "Loaded {} tasks from {}.",
                count,
                config.tasks_file.display()
            )?;
        }
        Ok(LoadOutcome::StartedEmpty) => {
            writeln!(
                stdout.lock(),
                "No save file at {}. Starting with an empty task list.",
                config.tasks_file.display()
            )?;
        }
        Err(e) => {
            // Recoverable: report and continue with whatever state the
            // store settled on (empty after corrupt data, unchanged after
            // an I/O failure).
            writeln!(stdout.lock(), "Error: {}", e)?;
        }
    }

    let mut shell = Shell::new(store, config.tasks_file, stdin.lock(), stdout.lock());
    shell.run()?;
    Ok(())
}
