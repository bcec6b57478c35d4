//! Summary command: per-task and aggregate statistics tables.

use std::io::Write;

use anyhow::Result;
use chrono::TimeDelta;

use tm_core::{SizeClass, Summary, SummaryFilter, TaskMap, TaskStats, Violation, summarize};
use tm_log::Executor;

use super::util::format_duration;

const TASK_HEADER: [&str; 8] = [
    "Task Name",
    "Total",
    "Mean",
    "Min",
    "Max",
    "Size",
    "Sessions",
    "Description",
];

pub fn run<W: Write>(writer: &mut W, executor: &Executor, filter_arg: Option<&str>) -> Result<()> {
    let tasks = executor.tasks();
    let filter = resolve_filter(tasks, filter_arg)?;
    let summary = summarize(tasks, &filter);

    match &filter {
        SummaryFilter::Name(_) => print_task_table(writer, &summary.tasks)?,
        SummaryFilter::Size(size) => {
            writeln!(writer, "Tasks with size: {size}")?;
            print_task_table(writer, &summary.tasks)?;
            writeln!(writer)?;
            writeln!(writer, "Total times of all tasks with size: {size}")?;
            print_aggregate(writer, &summary)?;
        }
        SummaryFilter::All => {
            writeln!(writer, "All tasks:")?;
            print_task_table(writer, &summary.tasks)?;
            writeln!(writer)?;
            writeln!(writer, "Total times of all tasks:")?;
            print_aggregate(writer, &summary)?;
        }
    }
    Ok(())
}

/// Interprets the optional summary argument: absent means all tasks, a
/// size class means a size filter, anything else is a task name.
fn resolve_filter(tasks: &TaskMap, arg: Option<&str>) -> Result<SummaryFilter> {
    let Some(raw) = arg else {
        return Ok(SummaryFilter::All);
    };
    if let Ok(size) = raw.parse::<SizeClass>() {
        return Ok(SummaryFilter::Size(size));
    }
    let name = raw.trim().to_lowercase();
    if !tasks.contains(&name) {
        return Err(Violation::NotFound { name }.into());
    }
    Ok(SummaryFilter::Name(name))
}

fn print_task_table<W: Write>(writer: &mut W, tasks: &[TaskStats]) -> Result<()> {
    let [name, total, mean, min, max, size, sessions, description] = TASK_HEADER;
    writeln!(
        writer,
        "{name:<16} | {total:>10} | {mean:>10} | {min:>10} | {max:>10} | {size:<4} | {sessions:>8} | {description}"
    )?;
    for stats in tasks {
        writeln!(
            writer,
            "{:<16} | {:>10} | {:>10} | {:>10} | {:>10} | {:<4} | {:>8} | {}",
            stats.name,
            format_duration(stats.total),
            format_duration(stats.mean),
            format_duration(stats.min),
            format_duration(stats.max),
            stats.size.map_or("-", SizeClass::as_str),
            stats.sessions,
            stats.description.as_deref().unwrap_or("-"),
        )?;
    }
    Ok(())
}

fn print_aggregate<W: Write>(writer: &mut W, summary: &Summary) -> Result<()> {
    let (min_name, min_total) = extremum(summary.min_task.as_ref());
    let (max_name, max_total) = extremum(summary.max_task.as_ref());

    writeln!(
        writer,
        "{:<12} | {:<12} | {:<18} | {:<18} | {:<14} | {}",
        "Total",
        "Mean",
        format!("Min: {min_name}"),
        format!("Max: {max_name}"),
        "Total Sessions",
        "Mean Sessions",
    )?;
    writeln!(
        writer,
        "{:<12} | {:<12} | {:<18} | {:<18} | {:<14} | {}",
        format_duration(summary.total),
        format_duration(summary.mean),
        format_duration(min_total),
        format_duration(max_total),
        summary.total_sessions,
        summary.mean_sessions,
    )?;
    Ok(())
}

fn extremum(stats: Option<&TaskStats>) -> (&str, TimeDelta) {
    stats.map_or(("none", TimeDelta::zero()), |s| (s.name.as_str(), s.total))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (tempfile::TempDir, Executor) {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("tm.log");
        std::fs::write(
            &path,
            "2024-01-15T10:00:00Z,alpha,start,null,null\n\
             2024-01-15T10:05:00Z,alpha,stop,null,null\n\
             2024-01-15T10:06:00Z,alpha,describe,port the parser,M\n\
             2024-01-15T11:00:00Z,beta,start,null,null\n\
             2024-01-15T11:01:00Z,beta,stop,null,null\n\
             2024-01-15T12:00:00Z,gamma,start,null,null\n",
        )
        .unwrap();
        let executor = Executor::load(&path).unwrap();
        (temp, executor)
    }

    fn output_of(executor: &Executor, filter: Option<&str>) -> String {
        let mut output = Vec::new();
        run(&mut output, executor, filter).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn summary_for_all_tasks() {
        let (_temp, executor) = fixture();
        let output = output_of(&executor, None);

        assert!(output.starts_with("All tasks:\n"));
        assert!(output.contains("Task Name"));
        // Rows appear in first-encountered order.
        let alpha = output.find("alpha").unwrap();
        let beta = output.find("beta").unwrap();
        let gamma = output.find("gamma").unwrap();
        assert!(alpha < beta && beta < gamma);

        assert!(output.contains("port the parser"));
        assert!(output.contains("Total times of all tasks:"));
        assert!(output.contains("Min: gamma"));
        assert!(output.contains("Max: alpha"));
        assert!(output.contains("6m 0s"), "total over closed intervals");
        assert!(output.contains("2m 0s"), "mean per task");
    }

    #[test]
    fn summary_for_one_task_prints_a_single_row() {
        let (_temp, executor) = fixture();
        let output = output_of(&executor, Some("Alpha"));

        assert!(output.contains("alpha"));
        assert!(output.contains("5m 0s"));
        assert!(!output.contains("beta"));
        assert!(!output.contains("Total times"));
    }

    #[test]
    fn summary_by_size_filters_tasks() {
        let (_temp, executor) = fixture();
        let output = output_of(&executor, Some("m"));

        assert!(output.starts_with("Tasks with size: M\n"));
        assert!(output.contains("alpha"));
        assert!(!output.contains("beta"));
        assert!(output.contains("Total times of all tasks with size: M"));
    }

    #[test]
    fn summary_of_unknown_task_is_rejected() {
        let (_temp, executor) = fixture();
        let mut output = Vec::new();
        let err = run(&mut output, &executor, Some("ghost")).unwrap_err();
        assert_eq!(err.to_string(), "ghost does not exist");
    }

    #[test]
    fn summary_of_empty_size_class_reports_zeroes() {
        let (_temp, executor) = fixture();
        let output = output_of(&executor, Some("XL"));

        assert!(output.contains("Min: none"));
        assert!(output.contains("Max: none"));
        assert!(output.contains("0s"));
    }
}
