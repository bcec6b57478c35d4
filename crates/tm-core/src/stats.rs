//! Duration and session statistics over reconciled task state.

use chrono::TimeDelta;

use crate::size::SizeClass;
use crate::task::{Interval, Task, TaskMap};

/// Which tasks a summary covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryFilter {
    /// Every task in the map.
    All,
    /// A single task, by lowercased name.
    Name(String),
    /// Every task with the given size classification.
    Size(SizeClass),
}

impl SummaryFilter {
    fn matches(&self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Name(name) => task.name() == name,
            Self::Size(size) => task.size() == Some(*size),
        }
    }
}

/// Per-task metrics. Open intervals count as sessions but contribute no
/// duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskStats {
    pub name: String,
    /// Sum of closed-interval durations.
    pub total: TimeDelta,
    /// Mean closed-interval duration, truncated to whole seconds.
    pub mean: TimeDelta,
    /// Shortest closed interval; zero when none are closed.
    pub min: TimeDelta,
    /// Longest closed interval; zero when none are closed.
    pub max: TimeDelta,
    /// Count of intervals, open or closed.
    pub sessions: usize,
    pub size: Option<SizeClass>,
    pub description: Option<String>,
}

impl TaskStats {
    /// Computes the metrics for one task.
    #[must_use]
    pub fn for_task(task: &Task) -> Self {
        let closed: Vec<TimeDelta> = task
            .intervals()
            .iter()
            .filter_map(Interval::duration)
            .collect();

        let total = closed
            .iter()
            .fold(TimeDelta::zero(), |acc, duration| acc + *duration);
        let mean = if closed.is_empty() {
            TimeDelta::zero()
        } else {
            truncate_seconds(total / i32::try_from(closed.len()).unwrap_or(i32::MAX))
        };

        Self {
            name: task.name().to_string(),
            total,
            mean,
            min: closed.iter().min().copied().unwrap_or_else(TimeDelta::zero),
            max: closed.iter().max().copied().unwrap_or_else(TimeDelta::zero),
            sessions: task.sessions(),
            size: task.size(),
            description: task.description().map(str::to_string),
        }
    }
}

/// Aggregate metrics across a filtered set of tasks.
///
/// An empty filtered set yields all-zero statistics with no min/max task;
/// it is never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Per-task statistics in first-encountered order.
    pub tasks: Vec<TaskStats>,
    /// Total time across the filtered set.
    pub total: TimeDelta,
    /// Mean total time per task, truncated to whole seconds.
    pub mean: TimeDelta,
    /// Task with the smallest total duration, ties broken by
    /// first-encountered order.
    pub min_task: Option<TaskStats>,
    /// Task with the largest total duration, same tie-breaking.
    pub max_task: Option<TaskStats>,
    /// Sessions across the filtered set.
    pub total_sessions: usize,
    /// Mean sessions per task (integer division).
    pub mean_sessions: usize,
}

/// Computes per-task and aggregate statistics for the tasks selected by
/// `filter`.
#[must_use]
pub fn summarize(tasks: &TaskMap, filter: &SummaryFilter) -> Summary {
    let per_task: Vec<TaskStats> = tasks
        .iter()
        .filter(|task| filter.matches(task))
        .map(TaskStats::for_task)
        .collect();

    let total = per_task
        .iter()
        .fold(TimeDelta::zero(), |acc, stats| acc + stats.total);
    let total_sessions: usize = per_task.iter().map(|stats| stats.sessions).sum();

    let (mean, mean_sessions) = if per_task.is_empty() {
        (TimeDelta::zero(), 0)
    } else {
        (
            truncate_seconds(total / i32::try_from(per_task.len()).unwrap_or(i32::MAX)),
            total_sessions / per_task.len(),
        )
    };

    // Strict comparisons keep the first-encountered task on ties.
    let mut min_task: Option<&TaskStats> = None;
    let mut max_task: Option<&TaskStats> = None;
    for stats in &per_task {
        if min_task.is_none_or(|current| stats.total < current.total) {
            min_task = Some(stats);
        }
        if max_task.is_none_or(|current| stats.total > current.total) {
            max_task = Some(stats);
        }
    }
    let min_task = min_task.cloned();
    let max_task = max_task.cloned();

    Summary {
        tasks: per_task,
        total,
        mean,
        min_task,
        max_task,
        total_sessions,
        mean_sessions,
    }
}

fn truncate_seconds(duration: TimeDelta) -> TimeDelta {
    TimeDelta::seconds(duration.num_seconds())
}
