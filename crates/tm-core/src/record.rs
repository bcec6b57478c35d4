//! On-disk event records, one per log line.
//!
//! # Line format
//!
//! `timestamp,name,command,description,size` — five comma-separated fields.
//! `timestamp` is an RFC 3339 instant, truncated to whole seconds on read.
//! `description` and `size` are optional; an absent field is serialized as
//! the literal `null` and read back as absent when the token is `null`
//! (case-insensitive) or empty.
//!
//! No escaping of embedded commas is defined: a description containing a
//! comma produces more than five fields and the record is rejected as
//! malformed on the next read. This limitation is carried over from the
//! historical format on purpose.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};

use crate::size::SizeClass;
use crate::violation::Violation;

/// The commands that may appear in a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Start,
    Stop,
    Describe,
    Size,
}

impl Command {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Describe => "describe",
            Self::Size => "size",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            "describe" => Ok(Self::Describe),
            "size" => Ok(Self::Size),
            _ => Err(UnknownCommand(s.to_string())),
        }
    }
}

/// Error type for command strings outside {start, stop, describe, size}.
#[derive(Debug, Clone)]
pub struct UnknownCommand(String);

impl fmt::Display for UnknownCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown command: {}", self.0)
    }
}

impl std::error::Error for UnknownCommand {}

/// A single validated event, as stored on one log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    /// When the event occurred, truncated to whole seconds.
    pub timestamp: DateTime<Utc>,
    /// Task key, lowercased.
    pub name: String,
    /// The action recorded by this line.
    pub command: Command,
    /// Free-text description; only meaningful for `describe`.
    pub description: Option<String>,
    /// Size classification; meaningful for `size` and `describe`.
    pub size: Option<SizeClass>,
}

impl EventRecord {
    /// Creates a record for `command` against `name`, stamped with the
    /// current instant.
    pub fn now(command: Command, name: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now().trunc_subsecs(0),
            name: name.into().to_lowercase(),
            command,
            description: None,
            size: None,
        }
    }

    /// Parses one log line into a validated record.
    ///
    /// Enforces the structural rules (five fields, parseable timestamp,
    /// present task name, known command) and the command-specific field
    /// requirements: `size` needs a valid size value, `describe` needs a
    /// non-empty description and may carry an optional size.
    pub fn parse_line(line: &str) -> Result<Self, Violation> {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != 5 {
            return Err(malformed(format!(
                "expected 5 fields, got {}",
                fields.len()
            )));
        }

        let timestamp = DateTime::parse_from_rfc3339(fields[0])
            .map_err(|_| malformed(format!("unparseable timestamp: {}", fields[0])))?
            .with_timezone(&Utc)
            .trunc_subsecs(0);

        let name = optional(fields[1])
            .ok_or_else(|| malformed("missing task name".to_string()))?
            .to_lowercase();

        let command: Command = fields[2]
            .parse()
            .map_err(|err: UnknownCommand| malformed(err.to_string()))?;

        let parse_size = |raw: &str| {
            raw.parse::<SizeClass>()
                .map_err(|err| malformed(err.to_string()))
        };

        let record = match command {
            // Start/stop lines ignore the trailing fields entirely.
            Command::Start | Command::Stop => Self {
                timestamp,
                name,
                command,
                description: None,
                size: None,
            },
            Command::Describe => {
                let description = optional(fields[3])
                    .map(str::to_string)
                    .ok_or_else(|| malformed("describe requires a description".to_string()))?;
                let size = optional(fields[4]).map(parse_size).transpose()?;
                Self {
                    timestamp,
                    name,
                    command,
                    description: Some(description),
                    size,
                }
            }
            Command::Size => {
                let size = optional(fields[4])
                    .map(parse_size)
                    .transpose()?
                    .ok_or_else(|| malformed("size command requires a size".to_string()))?;
                Self {
                    timestamp,
                    name,
                    command,
                    description: None,
                    size: Some(size),
                }
            }
        };
        Ok(record)
    }

    /// Serializes the record back into its on-disk line form.
    #[must_use]
    pub fn to_line(&self) -> String {
        format!(
            "{},{},{},{},{}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.name,
            self.command,
            self.description.as_deref().unwrap_or("null"),
            self.size.map_or("null", SizeClass::as_str),
        )
    }
}

/// Whether a raw field value reads back as absent: the empty string or the
/// literal `null`, case-insensitive.
///
/// Writers must reject names and descriptions made of these tokens; a
/// record carrying one would be dropped on the next reconciliation.
#[must_use]
pub fn is_absent_token(field: &str) -> bool {
    field.is_empty() || field.eq_ignore_ascii_case("null")
}

/// Maps the `null` token (case-insensitive) and the empty string to absent.
fn optional(field: &str) -> Option<&str> {
    if is_absent_token(field) {
        None
    } else {
        Some(field)
    }
}

fn malformed(reason: String) -> Violation {
    Violation::MalformedRecord { reason }
}
