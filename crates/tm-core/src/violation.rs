//! Rule violations reported by validation and reconciliation.

use std::fmt;

use thiserror::Error;

use crate::size::ParseSizeError;

/// A named rule violation carrying the task name and the violated condition.
///
/// Command validation failures abort the requested command without touching
/// the log; reconciliation failures drop the offending line instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Violation {
    /// `start` was requested while the task's latest interval is still open.
    #[error("{name} has not been stopped")]
    AlreadyRunning { name: String },

    /// `stop` was requested for a task that is not currently running.
    #[error("{name} has not been started")]
    NotRunning { name: String },

    /// The named task has never been created by a `start` event.
    #[error("{name} does not exist")]
    NotFound { name: String },

    /// A rename target already exists.
    #[error("{name} already exists")]
    AlreadyExists { name: String },

    /// A size value outside the {S, M, L, XL} enumeration.
    #[error("invalid size: {value}")]
    InvalidSize { value: String },

    /// A log line that cannot be parsed into a well-formed event record.
    #[error("malformed record: {reason}")]
    MalformedRecord { reason: String },

    /// A well-formed log line whose command is illegal in the current state.
    #[error("{name} {rule}")]
    Sequence { name: String, rule: SequenceRule },
}

impl From<ParseSizeError> for Violation {
    fn from(err: ParseSizeError) -> Self {
        Self::InvalidSize { value: err.0 }
    }
}

/// Sequencing conditions that cause a log line to be dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceRule {
    /// A non-start command referenced a task with no prior start.
    NeverStarted,
    /// A start arrived while the previous interval was still open.
    NeverStopped,
    /// A stop arrived with no open interval to close.
    NoMatchingStart,
    /// A stop timestamp earlier than its interval's start.
    NegativeDuration,
}

impl fmt::Display for SequenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NeverStarted => "never started",
            Self::NeverStopped => "never stopped",
            Self::NoMatchingStart => "no matching start",
            Self::NegativeDuration => "negative duration",
        };
        write!(f, "{s}")
    }
}
