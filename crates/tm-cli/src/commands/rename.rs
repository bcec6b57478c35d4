//! Rename command: move a task's entire history to a new name.

use std::io::Write;

use anyhow::Result;

use tm_log::Executor;

pub fn run<W: Write>(writer: &mut W, executor: &mut Executor, old: &str, new: &str) -> Result<()> {
    executor.rename(old, new)?;
    writeln!(
        writer,
        "Renamed {} to {}",
        old.trim().to_lowercase(),
        new.trim().to_lowercase()
    )?;
    Ok(())
}
