//! # TaskFlow
//!
//! A terminal task list manager. TaskFlow keeps an ordered list of tasks with
//! priorities, deadlines and notes, and offers both a scriptable CLI and an
//! interactive TUI over the same store.
//!
//! ## Usage
//!
//! ### Interactive Mode (TUI)
//!
//! ```bash
//! taskflow
//! # or explicitly
//! taskflow ui
//! ```
//!
//! **Key Bindings**
//! *   `q`: Quit
//! *   `j`/`k`: Move selection
//! *   `Space`: Toggle done
//! *   `a`: Add task (text, priority, deadline)
//! *   `e`: Edit text, `n`: Notes, `t`: Deadline, `p`: Cycle priority
//! *   `d`: Delete selected task
//! *   `f`: Cycle filter (all / active / completed)
//! *   `/`: Search text and notes
//! *   `x`: Clear completed tasks
//! *   `J`/`K`: Swap with the task below / above
//! *   `T`: Toggle light/dark theme
//!
//! ### Command Line Interface (CLI)
//!
//! ```bash
//! taskflow add "Write report" --priority high --deadline 2026-12-01
//! taskflow list --filter active --search report
//! taskflow toggle <ID>
//! taskflow export -o backup.json
//! taskflow import backup.json
//! ```
//!
//! ## Data Storage
//!
//! Tasks are saved as `taskflow_tasks` in your local data directory
//! (`~/.local/share/taskflow` on Linux). Override it with `--data-dir` or the
//! `TASKFLOW_DIR` environment variable. Logs go to `taskflow.log` in the same
//! directory.

use std::error::Error;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing::info;

use taskflow::commands::*;
use taskflow::storage::{default_data_dir, FileStorage};
use taskflow::store::TaskStore;
use taskflow::tui::run_tui;

#[derive(Parser)]
#[command(name = "taskflow")]
#[command(about = "Simple terminal task list", long_about = None)]
struct Cli {
    /// Directory holding the task data (defaults to $TASKFLOW_DIR or the XDG data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task at the top of the list
    Add {
        /// Task text (quoted if it has spaces)
        text: String,
        /// Priority: low, medium or high
        #[arg(short, long)]
        priority: Option<String>,
        /// Deadline in YYYY-MM-DD
        #[arg(short, long)]
        deadline: Option<String>,
    },
    /// List tasks in list order
    List {
        /// Filter: all, active or completed
        #[arg(short, long)]
        filter: Option<String>,
        /// Only tasks whose text or notes contain this
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Mark a task done, or reopen it
    Toggle {
        id: u64,
    },
    /// Remove a task
    Remove {
        id: u64,
    },
    /// Replace a task's text
    Edit {
        id: u64,
        text: String,
    },
    /// Set a task's priority
    Priority {
        id: u64,
        /// low, medium or high
        level: String,
    },
    /// Set or clear a task's deadline
    Deadline {
        id: u64,
        /// Deadline in YYYY-MM-DD
        date: Option<String>,
        /// Remove the deadline
        #[arg(long, conflicts_with = "date")]
        clear: bool,
    },
    /// Set a task's notes
    Notes {
        id: u64,
        text: String,
    },
    /// Swap the positions of two tasks
    Swap {
        a: u64,
        b: u64,
    },
    /// Remove all completed tasks
    Clear,
    /// Show completion statistics
    Stats,
    /// Export all tasks to a JSON file
    Export {
        /// Output file (default: taskflow_export_<date>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Import tasks from an exported JSON file
    Import {
        path: PathBuf,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Print a plain-text summary for sharing
    Share,
    /// Show or set the theme (light, dark, toggle)
    Theme {
        theme: Option<String>,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
    /// Open interactive TUI
    Ui,
}

fn setup_logging(dir: &Path, verbose: bool) -> Result<(), Box<dyn Error>> {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("taskflow.log"))?;

    // Write to a file, the terminal belongs to the TUI.
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(Commands::Completions { shell }) = &cli.command {
        let shell_enum = match shell.as_str() {
            "bash" => Shell::Bash,
            "zsh" => Shell::Zsh,
            "fish" => Shell::Fish,
            "powershell" => Shell::PowerShell,
            "elvish" => Shell::Elvish,
            _ => {
                eprintln!("Unsupported shell: {}", shell);
                return Ok(());
            }
        };
        let mut cmd = Cli::command();
        generate(shell_enum, &mut cmd, "taskflow", &mut io::stdout());
        return Ok(());
    }

    let storage = FileStorage::open(cli.data_dir.unwrap_or_else(default_data_dir))?;
    setup_logging(storage.dir(), cli.verbose)?;
    let mut store = TaskStore::open(storage);

    match cli.command {
        Some(Commands::Add { text, priority, deadline }) => cmd_add(&mut store, text, priority, deadline, false),
        Some(Commands::List { filter, search }) => cmd_list(&mut store, filter, search),
        Some(Commands::Toggle { id }) => cmd_toggle(&mut store, id, false),
        Some(Commands::Remove { id }) => cmd_remove(&mut store, id, false),
        Some(Commands::Edit { id, text }) => cmd_edit(&mut store, id, text, false),
        Some(Commands::Priority { id, level }) => cmd_priority(&mut store, id, level, false),
        Some(Commands::Deadline { id, date, clear }) => {
            if date.is_none() && !clear {
                eprintln!("Give a date (YYYY-MM-DD) or --clear.");
            } else {
                cmd_deadline(&mut store, id, date, false);
            }
        }
        Some(Commands::Notes { id, text }) => cmd_notes(&mut store, id, text, false),
        Some(Commands::Swap { a, b }) => cmd_swap(&mut store, a, b, false),
        Some(Commands::Clear) => cmd_clear(&mut store, false),
        Some(Commands::Stats) => cmd_stats(&store),
        Some(Commands::Export { output }) => cmd_export(&store, output, false),
        Some(Commands::Import { path, force }) => cmd_import(&mut store, path, force, false),
        Some(Commands::Share) => cmd_share(&store),
        Some(Commands::Theme { theme }) => cmd_theme(&mut store, theme, false),
        Some(Commands::Completions { .. }) => {}
        Some(Commands::Ui) | None => {
            if let Err(e) = run_tui(store) {
                eprintln!("Error running TUI: {}", e);
            }
        }
    }
    Ok(())
}
