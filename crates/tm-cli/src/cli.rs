//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Personal task time tracker.
///
/// Records every action as an event in an append-only log file and derives
/// task state and statistics by replaying it.
#[derive(Debug, Parser)]
#[command(name = "tm", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the event log file (overrides configuration).
    #[arg(short, long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start (or resume) tracking a task.
    Start {
        /// Task name.
        name: String,
    },

    /// Stop the running session of a task.
    Stop {
        /// Task name.
        name: String,
    },

    /// Attach a free-text description to a task.
    Describe {
        /// Task name.
        name: String,

        /// Description words. If the final word is S, M, L, or XL it is
        /// taken as the task's size instead.
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Classify a task's effort as S, M, L, or XL.
    Size {
        /// Task name.
        name: String,

        /// Size classification: S, M, L, or XL.
        size: String,
    },

    /// Rename a task, rewriting its entire log history.
    Rename {
        /// Current task name.
        old: String,

        /// New task name.
        new: String,
    },

    /// Delete a task and every log record referring to it.
    Delete {
        /// Task name.
        name: String,
    },

    /// Show duration and session statistics.
    Summary {
        /// Task name or size class; all tasks when omitted.
        filter: Option<String>,
    },
}
