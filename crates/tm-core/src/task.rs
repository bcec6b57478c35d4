//! Task state derived from the event log.

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};

use crate::size::SizeClass;
use crate::violation::SequenceRule;

// Upheld by construction: every task starts with one interval and
// intervals are never removed.
const NON_EMPTY: &str = "task always has at least one interval";

/// One start/stop pair. An interval with no stop instant is open: the task
/// is currently running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    start: DateTime<Utc>,
    stop: Option<DateTime<Utc>>,
}

impl Interval {
    #[must_use]
    pub const fn open(start: DateTime<Utc>) -> Self {
        Self { start, stop: None }
    }

    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.stop.is_some()
    }

    /// Duration of a closed interval; `None` while the interval is open.
    #[must_use]
    pub fn duration(&self) -> Option<TimeDelta> {
        self.stop.map(|stop| stop - self.start)
    }
}

/// A named unit of tracked work: an ordered interval history plus optional
/// description and size classification.
///
/// Invariants: a task always has at least one interval (creation requires a
/// start event), and at most one interval is open — always the last one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    name: String,
    description: Option<String>,
    size: Option<SizeClass>,
    intervals: Vec<Interval>,
}

impl Task {
    /// Creates a task with a single open interval, as the first valid
    /// `start` event does.
    pub fn started(name: impl Into<String>, start: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            description: None,
            size: None,
            intervals: vec![Interval::open(start)],
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub const fn size(&self) -> Option<SizeClass> {
        self.size
    }

    #[must_use]
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// Number of recorded sessions, open or closed.
    #[must_use]
    pub fn sessions(&self) -> usize {
        self.intervals.len()
    }

    /// The most recent interval. Tasks are never empty, so this always
    /// exists.
    #[must_use]
    pub fn last_interval(&self) -> &Interval {
        self.intervals.last().expect(NON_EMPTY)
    }

    fn last_interval_mut(&mut self) -> &mut Interval {
        self.intervals.last_mut().expect(NON_EMPTY)
    }

    /// Whether the most recent interval is still open.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.last_interval().is_closed()
    }

    /// Pushes a new open interval, rejecting a start while the previous
    /// interval is still open.
    pub fn start_interval(&mut self, start: DateTime<Utc>) -> Result<(), SequenceRule> {
        if self.is_running() {
            return Err(SequenceRule::NeverStopped);
        }
        self.intervals.push(Interval::open(start));
        Ok(())
    }

    /// Closes the open interval, rejecting a stop with nothing to close or
    /// one that would produce a negative duration.
    pub fn stop_interval(&mut self, stop: DateTime<Utc>) -> Result<(), SequenceRule> {
        if !self.is_running() {
            return Err(SequenceRule::NoMatchingStart);
        }
        let last = self.last_interval_mut();
        if stop < last.start {
            return Err(SequenceRule::NegativeDuration);
        }
        last.stop = Some(stop);
        Ok(())
    }

    /// Last write wins: a repeated describe replaces the previous text.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
    }

    pub const fn set_size(&mut self, size: SizeClass) {
        self.size = Some(size);
    }
}

/// Map from lowercased task name to task state, preserving the order in
/// which tasks were first encountered in the log.
///
/// First-encountered order is observable: summary listings iterate in it,
/// and min/max aggregate ties are broken by it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskMap {
    order: Vec<String>,
    tasks: HashMap<String, Task>,
}

impl TaskMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a newly created task. Replaces state but keeps the original
    /// position if the name was somehow already present.
    pub fn insert(&mut self, task: Task) {
        let name = task.name().to_string();
        if self.tasks.insert(name.clone(), task).is_none() {
            self.order.push(name);
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Task> {
        self.tasks.get_mut(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterates tasks in first-encountered order.
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.order.iter().filter_map(|name| self.tasks.get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(secs: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, secs).unwrap()
    }

    #[test]
    fn new_task_is_running() {
        let task = Task::started("alpha", ts(0));
        assert!(task.is_running());
        assert_eq!(task.sessions(), 1);
        assert_eq!(task.last_interval().start(), ts(0));
    }

    #[test]
    fn start_while_running_is_rejected() {
        let mut task = Task::started("alpha", ts(0));
        assert_eq!(task.start_interval(ts(5)), Err(SequenceRule::NeverStopped));
        assert_eq!(task.sessions(), 1);
    }

    #[test]
    fn stop_closes_the_last_interval() {
        let mut task = Task::started("alpha", ts(0));
        task.stop_interval(ts(30)).unwrap();
        assert!(!task.is_running());
        assert_eq!(
            task.last_interval().duration(),
            Some(TimeDelta::seconds(30))
        );
    }

    #[test]
    fn stop_without_open_interval_is_rejected() {
        let mut task = Task::started("alpha", ts(0));
        task.stop_interval(ts(10)).unwrap();
        assert_eq!(
            task.stop_interval(ts(20)),
            Err(SequenceRule::NoMatchingStart)
        );
    }

    #[test]
    fn stop_before_start_is_rejected() {
        let mut task = Task::started("alpha", ts(30));
        assert_eq!(
            task.stop_interval(ts(10)),
            Err(SequenceRule::NegativeDuration)
        );
        assert!(task.is_running(), "failed stop must leave the interval open");
    }

    #[test]
    fn at_most_one_open_interval_across_interleavings() {
        let mut task = Task::started("alpha", ts(0));
        let _ = task.start_interval(ts(1));
        task.stop_interval(ts(2)).unwrap();
        task.start_interval(ts(3)).unwrap();
        let _ = task.start_interval(ts(4));
        task.stop_interval(ts(5)).unwrap();

        let open = task.intervals().iter().filter(|i| !i.is_closed()).count();
        assert_eq!(open, 0);
        assert_eq!(task.sessions(), 2);
    }

    #[test]
    fn describe_overwrites() {
        let mut task = Task::started("alpha", ts(0));
        task.set_description("first");
        task.set_description("second");
        assert_eq!(task.description(), Some("second"));
    }

    #[test]
    fn task_map_preserves_first_encountered_order() {
        let mut map = TaskMap::new();
        map.insert(Task::started("charlie", ts(0)));
        map.insert(Task::started("alpha", ts(1)));
        map.insert(Task::started("bravo", ts(2)));

        let names: Vec<&str> = map.iter().map(Task::name).collect();
        assert_eq!(names, ["charlie", "alpha", "bravo"]);
        assert_eq!(map.len(), 3);
        assert!(map.contains("alpha"));
        assert!(!map.contains("delta"));
    }
}
