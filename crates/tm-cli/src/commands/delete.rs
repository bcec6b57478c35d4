//! Delete command: remove a task and all its log records.

use std::io::Write;

use anyhow::Result;

use tm_log::Executor;

pub fn run<W: Write>(writer: &mut W, executor: &mut Executor, name: &str) -> Result<()> {
    executor.delete(name)?;
    writeln!(writer, "Deleted {}", name.trim().to_lowercase())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_removes_the_task() {
        let temp = tempfile::tempdir().unwrap();
        let mut executor = Executor::load(temp.path().join("tm.log")).unwrap();
        executor.start("alpha").unwrap();
        executor.start("beta").unwrap();

        let mut output = Vec::new();
        run(&mut output, &mut executor, "alpha").unwrap();

        assert_eq!(String::from_utf8(output).unwrap(), "Deleted alpha\n");
        assert!(!executor.tasks().contains("alpha"));
        assert!(executor.tasks().contains("beta"));
    }

    #[test]
    fn delete_unknown_task_is_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let mut executor = Executor::load(temp.path().join("tm.log")).unwrap();

        let mut output = Vec::new();
        let err = run(&mut output, &mut executor, "ghost").unwrap_err();
        assert_eq!(err.to_string(), "ghost does not exist");
    }
}
