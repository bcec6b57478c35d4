//! Start command: begin a new tracking session for a task.

use std::io::Write;

use anyhow::Result;

use tm_log::Executor;

pub fn run<W: Write>(writer: &mut W, executor: &mut Executor, name: &str) -> Result<()> {
    executor.start(name)?;
    writeln!(writer, "Started {}", name.trim().to_lowercase())?;
    Ok(())
}
