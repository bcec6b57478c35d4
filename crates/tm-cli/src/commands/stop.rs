//! Stop command: close the running session of a task.

use std::io::Write;

use anyhow::Result;

use tm_log::Executor;

pub fn run<W: Write>(writer: &mut W, executor: &mut Executor, name: &str) -> Result<()> {
    executor.stop(name)?;
    writeln!(writer, "Stopped {}", name.trim().to_lowercase())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_closes_the_session() {
        let temp = tempfile::tempdir().unwrap();
        let mut executor = Executor::load(temp.path().join("tm.log")).unwrap();
        executor.start("alpha").unwrap();

        let mut output = Vec::new();
        run(&mut output, &mut executor, "alpha").unwrap();

        assert_eq!(String::from_utf8(output).unwrap(), "Stopped alpha\n");
        assert!(!executor.tasks().get("alpha").unwrap().is_running());
    }

    #[test]
    fn stop_without_start_is_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let mut executor = Executor::load(temp.path().join("tm.log")).unwrap();

        let mut output = Vec::new();
        let err = run(&mut output, &mut executor, "alpha").unwrap_err();
        assert_eq!(err.to_string(), "alpha has not been started");
    }
}
