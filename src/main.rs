// Copyright (c) 2025 Robert August Vincent II <pillarsdotnet@gmail.com>
// Co-author: Cursor-AI.

//! # tt — time tracker CLI
//!
//! Tracks start/stop intervals against projects (optionally narrowed to a task) and reports
//! totals. Data lives in `$HOME/.tt` by default (`--dir` or `TT_DIR` to override).
//!
//! ## Storage
//!
//! - `records/<project>.json`: `[{"start": "...", "end": "..." | null, "task": "..." | null}]`
//! - `current.json`: `{"key": "task@project", "generation": N}`; empty key when idle
//!
//! At most one interval is open at a time, system-wide, and it is always the last one of its
//! project.
//!
//! ## Subcommands
//!
//! | Command            | Description |
//! |--------------------|-------------|
//! | `start <key>`      | Start tracking `task@project` or `project`. |
//! | `stop`             | Close the running interval. |
//! | `reset`            | Restart the running interval's clock from now. |
//! | `cancel`           | Discard the running interval. |
//! | `status`           | Show what is being tracked and for how long. |
//! | `report [project]` | Table of intervals, per-project subtotals and a grand total. |
//! | `list`             | Project names. |
//! | `delete <project>` | Remove a project and its whole history. |
//! | `edit <project>`   | Open a project's record file in `$VISUAL` / `$EDITOR`. |

mod config;
mod editor;
mod error;
mod key;
mod logging;
mod render;
mod report;
mod session;
mod storage;
mod store;
mod tracker;

use std::path::PathBuf;
use std::process;

use chrono::{DateTime, FixedOffset, Local, SubsecRound};
use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::{Result, TrackError};
use crate::key::{check_project, Key};
use crate::render::{format_time, render_report, Printer};
use crate::report::{build_report, format_duration};
use crate::storage::Storage;
use crate::tracker::{StartOutcome, Status, Tracker};

#[derive(Parser)]
#[command(name = "tt")]
#[command(about = "Track time against projects and tasks")]
#[command(version)]
struct Cli {
    /// Data directory (default: $HOME/.tt)
    #[arg(long, global = true, env = "TT_DIR", value_name = "PATH")]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start tracking a key: `task@project` or `project`
    Start {
        #[arg(value_name = "KEY")]
        key: String,
    },

    /// Stop the current session
    Stop,

    /// Restart the current session's clock from now
    Reset,

    /// Discard the current session
    Cancel,

    /// Show the current session
    Status,

    /// Report tracked time for some or all projects
    Report {
        /// Projects to include (default: all)
        #[arg(value_name = "PROJECT")]
        projects: Vec<String>,

        /// Print rows as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List projects
    List,

    /// Delete a project and all of its history
    Delete {
        #[arg(value_name = "PROJECT")]
        project: String,
    },

    /// Edit a project's record file in $VISUAL / $EDITOR
    Edit {
        #[arg(value_name = "PROJECT")]
        project: String,
    },
}

/// Current time, whole seconds, local offset.
fn now() -> DateTime<FixedOffset> {
    Local::now().fixed_offset().trunc_subsecs(0)
}

/// Starts tracking; starting the key already being tracked is a no-op.
fn cmd_start(tracker: &Tracker, raw: &str, out: Printer) -> Result<()> {
    let key = Key::parse(raw)?;
    match tracker.start(&key, now())? {
        StartOutcome::Started(interval) => {
            out.success(&format!(
                "Started tracking {} at {}",
                key,
                format_time(&interval.start)
            ));
        }
        StartOutcome::AlreadyTracking(key) => {
            out.info(&format!("Already tracking {}", key));
        }
    }
    Ok(())
}

fn cmd_stop(tracker: &Tracker, out: Printer) -> Result<()> {
    let stopped = tracker.stop(now())?;
    out.success(&format!(
        "Stopped tracking {} after {}",
        stopped.key,
        format_duration(stopped.interval.seconds().unwrap_or(0))
    ));
    Ok(())
}

fn cmd_reset(tracker: &Tracker, out: Printer) -> Result<()> {
    let reset = tracker.reset(now())?;
    out.success(&format!(
        "Restarted {} at {}",
        reset.key,
        format_time(&reset.interval.start)
    ));
    Ok(())
}

fn cmd_cancel(tracker: &Tracker, out: Printer) -> Result<()> {
    let cancelled = tracker.cancel()?;
    let discarded = (now() - cancelled.interval.start).num_seconds();
    out.success(&format!(
        "Cancelled {}; discarded {}",
        cancelled.key,
        format_duration(discarded)
    ));
    Ok(())
}

fn cmd_status(tracker: &Tracker, out: Printer) -> Result<()> {
    match tracker.status(now())? {
        Status::Idle => out.info("Not tracking"),
        Status::Tracking {
            key,
            start,
            elapsed,
        } => out.info(&format!(
            "Tracking {} since {} ({})",
            key,
            format_time(&start),
            format_duration(elapsed.num_seconds())
        )),
    }
    Ok(())
}

fn cmd_report(tracker: &Tracker, projects: &[String], json: bool, out: Printer) -> Result<()> {
    let report = build_report(tracker.records(), projects)?;
    tracing::debug!(rows = report.rows.len(), total = report.total_seconds(), "report built");
    if json {
        let rendered = serde_json::to_string_pretty(&report.rows).map_err(std::io::Error::other)?;
        println!("{}", rendered);
    } else {
        println!("{}", render_report(&report, out.color));
    }
    Ok(())
}

fn cmd_list(tracker: &Tracker) -> Result<()> {
    for project in tracker.records().list_projects()? {
        println!("{}", project);
    }
    Ok(())
}

fn cmd_delete(tracker: &Tracker, project: &str, out: Printer) -> Result<()> {
    tracker.delete(project)?;
    out.success(&format!("Deleted project {}", project));
    Ok(())
}

/// Opens the project's record file in an editor, then checks it still parses.
fn cmd_edit(tracker: &Tracker, project: &str) -> Result<()> {
    check_project(project)?;
    let records = tracker.records();
    if !records.exists(project) {
        return Err(TrackError::NotFound(project.to_string()));
    }
    editor::open_in_editor(&records.path(project))?;
    records.load(project)?;
    Ok(())
}

fn run(command: Commands, config: &Config, out: Printer) -> Result<()> {
    let storage = Storage::init(&config.root)?;
    tracing::debug!(root = %storage.root().display(), "storage ready");
    let tracker = Tracker::new(&storage);
    match command {
        Commands::Start { key } => cmd_start(&tracker, &key, out),
        Commands::Stop => cmd_stop(&tracker, out),
        Commands::Reset => cmd_reset(&tracker, out),
        Commands::Cancel => cmd_cancel(&tracker, out),
        Commands::Status => cmd_status(&tracker, out),
        Commands::Report { projects, json } => cmd_report(&tracker, &projects, json, out),
        Commands::List => cmd_list(&tracker),
        Commands::Delete { project } => cmd_delete(&tracker, &project, out),
        Commands::Edit { project } => cmd_edit(&tracker, &project),
    }
}

fn main() {
    logging::init();
    let cli = Cli::parse();
    let config = Config::resolve(cli.dir);
    let out = Printer::new(&config);
    if let Err(e) = run(cli.command, &config, out) {
        out.error(&e.to_string());
        process::exit(1);
    }
}
