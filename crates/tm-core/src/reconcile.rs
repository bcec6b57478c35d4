//! Log reconciliation: deterministic replay of the event log into task
//! state, plus compaction of invalid lines.

use crate::record::{Command, EventRecord};
use crate::task::{Task, TaskMap};
use crate::violation::{SequenceRule, Violation};

/// Diagnostic for a line dropped during reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedLine {
    /// 1-based position in the input, counting blank lines.
    pub line_no: usize,
    /// The raw line text that was dropped.
    pub line: String,
    /// The violated condition.
    pub reason: Violation,
}

/// The output of replaying a log: validated task state, the lines worth
/// keeping, and diagnostics for everything that was not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Task state in first-encountered order.
    pub tasks: TaskMap,
    /// Valid lines in their original order; the compacted log content.
    pub retained: Vec<String>,
    /// Lines dropped for being malformed or sequence-violating.
    pub dropped: Vec<DroppedLine>,
}

/// Replays raw log lines, in order, into task state.
///
/// Later lines' effects supersede or extend earlier ones. Blank lines are
/// skipped silently; malformed or sequence-violating lines are dropped with
/// a warning naming the line number, task, and violated condition. The
/// function is idempotent on its own output: reconciling `retained` again
/// drops nothing and rebuilds the identical task map.
pub fn reconcile<'a, I>(lines: I) -> Reconciliation
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out = Reconciliation::default();

    for (idx, raw) in lines.into_iter().enumerate() {
        let line_no = idx + 1;
        if raw.trim().is_empty() {
            continue;
        }

        let record = match EventRecord::parse_line(raw) {
            Ok(record) => record,
            Err(reason) => {
                tracing::warn!(line_no, line = raw, %reason, "dropping log line");
                out.dropped.push(DroppedLine {
                    line_no,
                    line: raw.to_string(),
                    reason,
                });
                continue;
            }
        };

        match apply_record(&mut out.tasks, &record) {
            Ok(()) => out.retained.push(raw.to_string()),
            Err(reason) => {
                tracing::warn!(line_no, task = record.name, %reason, "dropping log line");
                out.dropped.push(DroppedLine {
                    line_no,
                    line: raw.to_string(),
                    reason,
                });
            }
        }
    }

    out
}

/// Applies one validated record to the task map, enforcing the sequencing
/// rules. On error the map is left untouched.
pub fn apply_record(tasks: &mut TaskMap, record: &EventRecord) -> Result<(), Violation> {
    let sequence = |rule| Violation::Sequence {
        name: record.name.clone(),
        rule,
    };

    match record.command {
        Command::Start => match tasks.get_mut(&record.name) {
            None => {
                tasks.insert(Task::started(record.name.clone(), record.timestamp));
                Ok(())
            }
            Some(task) => task.start_interval(record.timestamp).map_err(sequence),
        },
        Command::Stop => {
            let Some(task) = tasks.get_mut(&record.name) else {
                return Err(sequence(SequenceRule::NeverStarted));
            };
            task.stop_interval(record.timestamp).map_err(sequence)
        }
        Command::Describe => {
            let Some(task) = tasks.get_mut(&record.name) else {
                return Err(sequence(SequenceRule::NeverStarted));
            };
            if let Some(description) = &record.description {
                task.set_description(description.clone());
            }
            if let Some(size) = record.size {
                task.set_size(size);
            }
            Ok(())
        }
        Command::Size => {
            let Some(task) = tasks.get_mut(&record.name) else {
                return Err(sequence(SequenceRule::NeverStarted));
            };
            if let Some(size) = record.size {
                task.set_size(size);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::size::SizeClass;
    use chrono::TimeDelta;

    fn lines(log: &str) -> Vec<&str> {
        log.lines().collect()
    }

    #[test]
    fn start_stop_roundtrip_builds_one_closed_interval() {
        let log = "2024-01-15T10:00:00Z,alpha,start,null,null\n\
                   2024-01-15T10:05:00Z,alpha,stop,null,null";
        let rec = reconcile(lines(log));

        assert!(rec.dropped.is_empty());
        assert_eq!(rec.retained.len(), 2);
        let task = rec.tasks.get("alpha").unwrap();
        assert_eq!(task.sessions(), 1);
        assert_eq!(
            task.last_interval().duration(),
            Some(TimeDelta::seconds(300))
        );
        assert!(task.description().is_none());
        assert!(task.size().is_none());
    }

    #[test]
    fn double_start_drops_the_second_line() {
        let log = "2024-01-15T10:00:00Z,alpha,start,null,null\n\
                   2024-01-15T10:01:00Z,alpha,start,null,null";
        let rec = reconcile(lines(log));

        assert_eq!(rec.retained.len(), 1);
        assert_eq!(rec.dropped.len(), 1);
        assert_eq!(rec.dropped[0].line_no, 2);
        assert_eq!(
            rec.dropped[0].reason,
            Violation::Sequence {
                name: "alpha".to_string(),
                rule: SequenceRule::NeverStopped,
            }
        );

        let task = rec.tasks.get("alpha").unwrap();
        assert_eq!(task.sessions(), 1);
        assert!(task.is_running());
    }

    #[test]
    fn stop_without_start_is_dropped() {
        let log = "2024-01-15T10:00:00Z,alpha,stop,null,null";
        let rec = reconcile(lines(log));

        assert!(rec.retained.is_empty());
        assert!(rec.tasks.is_empty());
        assert_eq!(
            rec.dropped[0].reason,
            Violation::Sequence {
                name: "alpha".to_string(),
                rule: SequenceRule::NeverStarted,
            }
        );
    }

    #[test]
    fn second_stop_has_no_matching_start() {
        let log = "2024-01-15T10:00:00Z,alpha,start,null,null\n\
                   2024-01-15T10:05:00Z,alpha,stop,null,null\n\
                   2024-01-15T10:06:00Z,alpha,stop,null,null";
        let rec = reconcile(lines(log));

        assert_eq!(rec.retained.len(), 2);
        assert_eq!(
            rec.dropped[0].reason,
            Violation::Sequence {
                name: "alpha".to_string(),
                rule: SequenceRule::NoMatchingStart,
            }
        );
    }

    #[test]
    fn negative_duration_stop_is_dropped_and_interval_stays_open() {
        let log = "2024-01-15T10:00:00Z,alpha,start,null,null\n\
                   2024-01-15T09:00:00Z,alpha,stop,null,null";
        let rec = reconcile(lines(log));

        assert_eq!(rec.retained.len(), 1);
        assert_eq!(
            rec.dropped[0].reason,
            Violation::Sequence {
                name: "alpha".to_string(),
                rule: SequenceRule::NegativeDuration,
            }
        );
        assert!(rec.tasks.get("alpha").unwrap().is_running());
    }

    #[test]
    fn describe_and_size_update_state() {
        let log = "2024-01-15T10:00:00Z,alpha,start,null,null\n\
                   2024-01-15T10:01:00Z,alpha,describe,first pass,null\n\
                   2024-01-15T10:02:00Z,alpha,describe,final pass,M\n\
                   2024-01-15T10:03:00Z,alpha,size,null,XL";
        let rec = reconcile(lines(log));

        assert!(rec.dropped.is_empty());
        let task = rec.tasks.get("alpha").unwrap();
        assert_eq!(task.description(), Some("final pass"));
        assert_eq!(task.size(), Some(SizeClass::Xl));
    }

    #[test]
    fn describe_against_unknown_task_never_started() {
        let log = "2024-01-15T10:00:00Z,alpha,describe,orphan note,null";
        let rec = reconcile(lines(log));

        assert!(rec.tasks.is_empty());
        assert_eq!(
            rec.dropped[0].reason,
            Violation::Sequence {
                name: "alpha".to_string(),
                rule: SequenceRule::NeverStarted,
            }
        );
    }

    #[test]
    fn unparsable_timestamp_is_dropped_with_line_number() {
        let log = "2024-01-15T10:00:00Z,alpha,start,null,null\n\
                   not-a-time,alpha,stop,null,null";
        let rec = reconcile(lines(log));

        assert_eq!(rec.dropped.len(), 1);
        assert_eq!(rec.dropped[0].line_no, 2);
        assert!(matches!(
            rec.dropped[0].reason,
            Violation::MalformedRecord { .. }
        ));
        // The bad stop must not have closed the interval.
        assert!(rec.tasks.get("alpha").unwrap().is_running());
    }

    #[test]
    fn blank_lines_are_skipped_without_diagnostics() {
        let log = "\n2024-01-15T10:00:00Z,alpha,start,null,null\n   \n";
        let rec = reconcile(lines(log));

        assert_eq!(rec.retained.len(), 1);
        assert!(rec.dropped.is_empty());
    }

    #[test]
    fn task_names_are_case_normalized() {
        let log = "2024-01-15T10:00:00Z,Alpha,start,null,null\n\
                   2024-01-15T10:05:00Z,ALPHA,stop,null,null";
        let rec = reconcile(lines(log));

        assert!(rec.dropped.is_empty());
        assert_eq!(rec.tasks.len(), 1);
        assert!(!rec.tasks.get("alpha").unwrap().is_running());
    }

    #[test]
    fn reconcile_is_a_fixed_point_on_its_own_output() {
        let log = "2024-01-15T10:00:00Z,alpha,start,null,null\n\
                   2024-01-15T10:01:00Z,alpha,start,null,null\n\
                   garbage line\n\
                   2024-01-15T10:05:00Z,alpha,stop,null,null\n\
                   2024-01-15T10:06:00Z,beta,stop,null,null\n\
                   2024-01-15T10:07:00Z,beta,start,null,null\n\
                   2024-01-15T10:08:00Z,alpha,size,null,L";
        let first = reconcile(lines(log));
        assert!(!first.dropped.is_empty());

        let second = reconcile(first.retained.iter().map(String::as_str));
        assert!(second.dropped.is_empty(), "second pass must drop nothing");
        assert_eq!(second.retained, first.retained);
        assert_eq!(second.tasks, first.tasks);
    }
}
