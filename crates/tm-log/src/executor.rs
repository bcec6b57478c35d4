//! Command execution: validates requested actions against reconciled state,
//! then appends to or rewrites the log.

use std::path::PathBuf;

use thiserror::Error;

use tm_core::{
    Command, EventRecord, SizeClass, Task, TaskMap, Violation, apply_record, is_absent_token,
    reconcile,
};

use crate::store::{EventLog, LogError};

/// Errors surfaced by command execution.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// The requested action violates current state invariants. The log is
    /// left untouched.
    #[error(transparent)]
    Violation(#[from] Violation),
    /// The log could not be read or written.
    #[error(transparent)]
    Log(#[from] LogError),
}

/// Executes user commands against the reconciled task state.
///
/// Loading replays the whole log and compacts it in place when invalid
/// lines were dropped. Each operation validates first; only legal actions
/// reach the log, as an append or an atomic whole-file rewrite. Task names
/// are lowercased on entry, so lookups and log matching are
/// case-insensitive.
#[derive(Debug)]
pub struct Executor {
    log: EventLog,
    tasks: TaskMap,
}

impl Executor {
    /// Opens the log at `path` and reconciles it into task state.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ExecutorError> {
        let log = EventLog::open(path)?;
        let mut executor = Self {
            log,
            tasks: TaskMap::new(),
        };
        executor.reload()?;
        Ok(executor)
    }

    /// The reconciled task state backing validation and summaries.
    #[must_use]
    pub const fn tasks(&self) -> &TaskMap {
        &self.tasks
    }

    /// Records a start event, rejecting a task that is already running.
    pub fn start(&mut self, name: &str) -> Result<(), ExecutorError> {
        let name = normalize(name)?;
        if self.tasks.get(&name).is_some_and(Task::is_running) {
            return Err(Violation::AlreadyRunning { name }.into());
        }
        self.append(EventRecord::now(Command::Start, name))
    }

    /// Records a stop event, rejecting a task that is not running.
    pub fn stop(&mut self, name: &str) -> Result<(), ExecutorError> {
        let name = normalize(name)?;
        if !self.tasks.get(&name).is_some_and(Task::is_running) {
            return Err(Violation::NotRunning { name }.into());
        }
        self.append(EventRecord::now(Command::Stop, name))
    }

    /// Records a description for an existing task, optionally updating its
    /// size as well.
    pub fn describe(
        &mut self,
        name: &str,
        description: &str,
        size: Option<SizeClass>,
    ) -> Result<(), ExecutorError> {
        let name = normalize(name)?;
        let description = description.trim();
        if is_absent_token(description) {
            return Err(Violation::MalformedRecord {
                reason: "describe requires a description".to_string(),
            }
            .into());
        }
        if !self.tasks.contains(&name) {
            return Err(Violation::NotFound { name }.into());
        }
        let mut record = EventRecord::now(Command::Describe, name);
        record.description = Some(description.to_string());
        record.size = size;
        self.append(record)
    }

    /// Records a size classification for an existing task.
    pub fn set_size(&mut self, name: &str, size: SizeClass) -> Result<(), ExecutorError> {
        let name = normalize(name)?;
        if !self.tasks.contains(&name) {
            return Err(Violation::NotFound { name }.into());
        }
        let mut record = EventRecord::now(Command::Size, name);
        record.size = Some(size);
        self.append(record)
    }

    /// Rewrites every record of `old` to `new`, preserving all other fields
    /// and line order.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<(), ExecutorError> {
        let old = normalize(old)?;
        let new = normalize(new)?;
        if !self.tasks.contains(&old) {
            return Err(Violation::NotFound { name: old }.into());
        }
        if self.tasks.contains(&new) {
            return Err(Violation::AlreadyExists { name: new }.into());
        }
        self.log.rename_task(&old, &new)?;
        self.reload()
    }

    /// Removes every record of `name` from the log.
    pub fn delete(&mut self, name: &str) -> Result<(), ExecutorError> {
        let name = normalize(name)?;
        if !self.tasks.contains(&name) {
            return Err(Violation::NotFound { name }.into());
        }
        self.log.delete_task(&name)?;
        self.reload()
    }

    /// Appends a pre-validated record and folds it into the in-memory state
    /// so subsequent operations in the same process see it.
    fn append(&mut self, record: EventRecord) -> Result<(), ExecutorError> {
        self.log.append(&record)?;
        apply_record(&mut self.tasks, &record)?;
        Ok(())
    }

    /// Replays the log from disk, compacting it when invalid lines were
    /// dropped.
    fn reload(&mut self) -> Result<(), ExecutorError> {
        let lines = self.log.read_lines()?;
        let reconciliation = reconcile(lines.iter().map(String::as_str));
        if reconciliation.retained.len() != lines.len() {
            tracing::debug!(
                path = %self.log.path().display(),
                dropped = lines.len() - reconciliation.retained.len(),
                "compacting log"
            );
            self.log.rewrite(&reconciliation.retained)?;
        }
        self.tasks = reconciliation.tasks;
        Ok(())
    }
}

/// Lowercases a task name, rejecting values the log format cannot hold: a
/// name that reads back as absent would make the appended record vanish on
/// the next reconciliation.
fn normalize(name: &str) -> Result<String, Violation> {
    let name = name.trim().to_lowercase();
    if is_absent_token(&name) {
        return Err(Violation::MalformedRecord {
            reason: "missing task name".to_string(),
        });
    }
    Ok(name)
}
