//! Core domain logic for the task time tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Event records: the on-disk line format of the append-only log
//! - Reconciliation: replaying the log into validated task state
//! - Statistics: per-task and aggregate duration/session metrics

pub mod record;
pub mod reconcile;
pub mod size;
pub mod stats;
pub mod task;
mod violation;

pub use record::{Command, EventRecord, is_absent_token};
pub use reconcile::{DroppedLine, Reconciliation, apply_record, reconcile};
pub use size::{ParseSizeError, SizeClass};
pub use stats::{Summary, SummaryFilter, TaskStats, summarize};
pub use task::{Interval, Task, TaskMap};
pub use violation::{SequenceRule, Violation};
