use std::path::{Path, PathBuf};
use std::process;

use tracing::debug;

use crate::error::{GitError, Result};
use crate::git::command::Command;

/// Executes a rendered [`Command`] and returns the captured output lines.
///
/// Implementations block until the process (or pipeline) completes. A
/// non-zero exit must surface as [`GitError::ExecutionFailed`] carrying the
/// exit code and whatever stdout was captured before the failure.
pub trait Shell {
    fn exec(&self, command: &Command) -> Result<Vec<String>>;
}

/// Runs commands through `sh -c` in a fixed working directory.
///
/// Pipelines and stderr redirects are shell syntax, so the rendered command
/// line is handed to the shell as-is.
#[derive(Debug)]
pub struct SystemShell {
    working_dir: PathBuf,
}

impl SystemShell {
    /// Create a shell rooted at the given directory
    pub fn new<P: AsRef<Path>>(working_dir: P) -> Self {
        Self {
            working_dir: working_dir.as_ref().to_path_buf(),
        }
    }

    /// Get the working directory commands run in
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }
}

impl Shell for SystemShell {
    fn exec(&self, command: &Command) -> Result<Vec<String>> {
        let rendered = command.render();
        debug!(command = %rendered, "executing");

        let output = process::Command::new("sh")
            .arg("-c")
            .arg(&rendered)
            .current_dir(&self.working_dir)
            .output()?;

        let lines = split_lines(&output.stdout);

        if !output.status.success() {
            return Err(GitError::ExecutionFailed {
                command: rendered,
                code: output.status.code().unwrap_or(-1),
                output: lines,
            });
        }

        Ok(lines)
    }
}

fn split_lines(stdout: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_exec_captures_stdout_lines() {
        let temp = TempDir::new().unwrap();
        let shell = SystemShell::new(temp.path());

        let command = Command::program("echo").with_argument("hello");
        let lines = shell.exec(&command).unwrap();

        assert_eq!(lines, vec!["hello".to_string()]);
    }

    #[test]
    fn test_exec_runs_pipelines() {
        let temp = TempDir::new().unwrap();
        let shell = SystemShell::new(temp.path());

        let command = Command::program("echo")
            .with_argument("hello")
            .pipe(Command::program("tr").with_argument("a-z").with_argument("A-Z"));
        let lines = shell.exec(&command).unwrap();

        assert_eq!(lines, vec!["HELLO".to_string()]);
    }

    #[test]
    fn test_exec_failure_carries_exit_code_and_partial_output() {
        let temp = TempDir::new().unwrap();
        let shell = SystemShell::new(temp.path());

        // Emit a line, then fail
        let command = Command::program("sh")
            .with_short_option_value("c", "'echo partial; exit 3'");
        let err = shell.exec(&command).unwrap_err();

        match err {
            GitError::ExecutionFailed { code, output, .. } => {
                assert_eq!(code, 3);
                assert_eq!(output, vec!["partial".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_exec_discards_redirected_stderr() {
        let temp = TempDir::new().unwrap();
        let shell = SystemShell::new(temp.path());

        let command = Command::new()
            .with_argument("rev-parse")
            .with_option("show-toplevel")
            .with_stderr_to("/dev/null");
        let err = shell.exec(&command).unwrap_err();

        // Not a repository: fails, but nothing leaks to stdout
        match err {
            GitError::ExecutionFailed { output, .. } => assert!(output.is_empty()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_working_dir() {
        let temp = TempDir::new().unwrap();
        let shell = SystemShell::new(temp.path());

        assert_eq!(shell.working_dir(), temp.path());
    }
}
