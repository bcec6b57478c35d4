//! Size command: classify a task's effort.

use std::io::Write;

use anyhow::Result;

use tm_core::{SizeClass, Violation};
use tm_log::Executor;

pub fn run<W: Write>(writer: &mut W, executor: &mut Executor, name: &str, size: &str) -> Result<()> {
    let size: SizeClass = size.parse().map_err(Violation::from)?;
    executor.set_size(name, size)?;
    writeln!(writer, "Sized {} as {size}", name.trim().to_lowercase())?;
    Ok(())
}
