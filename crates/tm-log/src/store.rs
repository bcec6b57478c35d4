//! The append-only event log file.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

use tm_core::EventRecord;

/// Log storage errors.
#[derive(Debug, Error)]
pub enum LogError {
    /// The log file could not be read.
    #[error("failed to read log {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The log file could not be written.
    #[error("failed to write log {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Handle to the on-disk event log.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    /// Opens the log at `path`, creating parent directories and an empty
    /// file if nothing exists there yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LogError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| LogError::Write {
                path: path.clone(),
                source,
            })?;
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| LogError::Write {
                path: path.clone(),
                source,
            })?;
        Ok(Self { path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole log into memory, one entry per line.
    pub fn read_lines(&self) -> Result<Vec<String>, LogError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| LogError::Read {
            path: self.path.clone(),
            source,
        })?;
        Ok(content.lines().map(str::to_string).collect())
    }

    /// Appends one event record to the end of the log.
    pub fn append(&self, record: &EventRecord) -> Result<(), LogError> {
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|source| self.write_error(source))?;
        writeln!(file, "{}", record.to_line()).map_err(|source| self.write_error(source))?;
        tracing::debug!(task = record.name, command = %record.command, "appended event");
        Ok(())
    }

    /// Replaces the entire log content atomically: the new content is
    /// written to a temporary file in the log's directory, then persisted
    /// over the original in one rename.
    pub fn rewrite(&self, lines: &[String]) -> Result<(), LogError> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir).map_err(|source| self.write_error(source))?;
        for line in lines {
            writeln!(tmp, "{line}").map_err(|source| self.write_error(source))?;
        }
        tmp.persist(&self.path)
            .map_err(|err| self.write_error(err.error))?;
        tracing::debug!(lines = lines.len(), "rewrote log");
        Ok(())
    }

    /// Rewrites every record of `old` to carry `new` instead, preserving
    /// all other fields and line order. Matching is case-insensitive.
    pub fn rename_task(&self, old: &str, new: &str) -> Result<(), LogError> {
        let renamed: Vec<String> = self
            .read_lines()?
            .into_iter()
            .map(|line| match split_name_field(&line) {
                Some((timestamp, name, rest)) if name.trim().eq_ignore_ascii_case(old) => {
                    format!("{timestamp},{new},{rest}")
                }
                _ => line,
            })
            .collect();
        self.rewrite(&renamed)
    }

    /// Removes every record of `name` from the log (case-insensitive),
    /// keeping the remaining lines in their original order.
    pub fn delete_task(&self, name: &str) -> Result<(), LogError> {
        let remaining: Vec<String> = self
            .read_lines()?
            .into_iter()
            .filter(|line| {
                !split_name_field(line)
                    .is_some_and(|(_, field, _)| field.trim().eq_ignore_ascii_case(name))
            })
            .collect();
        self.rewrite(&remaining)
    }

    fn write_error(&self, source: io::Error) -> LogError {
        LogError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

/// Splits a line at its first two commas: `(timestamp, name, rest)`.
/// Returns `None` for lines without a name field; those are left for the
/// reconciler to reject.
fn split_name_field(line: &str) -> Option<(&str, &str, &str)> {
    let mut parts = line.splitn(3, ',');
    Some((parts.next()?, parts.next()?, parts.next()?))
}
