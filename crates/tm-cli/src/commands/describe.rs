//! Describe command: attach free text, with an optional trailing size.

use std::io::Write;

use anyhow::{Result, bail};

use tm_core::SizeClass;
use tm_log::Executor;

pub fn run<W: Write>(
    writer: &mut W,
    executor: &mut Executor,
    name: &str,
    text: &[String],
) -> Result<()> {
    let (description, size) = split_trailing_size(text);
    if description.is_empty() {
        bail!("missing description, usage: describe <task name> <description> [S|M|L|XL]");
    }
    executor.describe(name, &description, size)?;

    let name = name.trim().to_lowercase();
    match size {
        Some(size) => writeln!(writer, "Described {name} (size {size})")?,
        None => writeln!(writer, "Described {name}")?,
    }
    Ok(())
}

/// Joins the words into a description; when the final word parses as a
/// size class it becomes the size instead.
fn split_trailing_size(text: &[String]) -> (String, Option<SizeClass>) {
    match text.split_last() {
        Some((last, rest)) => match last.parse::<SizeClass>() {
            Ok(size) => (rest.join(" "), Some(size)),
            Err(_) => (text.join(" "), None),
        },
        None => (String::new(), None),
    }
}
