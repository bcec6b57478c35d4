//! Storage layer for the task time tracker.
//!
//! Provides the append-only event log: a plain-text file with one
//! comma-separated event record per line (see [`tm_core::record`] for the
//! line format).
//!
//! # Durability
//!
//! Appends go straight to the end of the file. Whole-file mutations
//! (compaction, rename, delete) never touch the original in place: the full
//! replacement is written to a temporary file in the same directory and then
//! atomically persisted over the log, so a crash mid-write cannot leave a
//! partially written log behind.
//!
//! # Concurrency
//!
//! The log is a single local file accessed by one short-lived process at a
//! time. There is no file locking; concurrent invocations can race. Anything
//! long-running built on top of this crate must add its own locking.

mod executor;
mod store;

pub use executor::{Executor, ExecutorError};
pub use store::{EventLog, LogError};
