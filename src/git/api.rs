use std::cell::RefCell;

use crate::error::{GitError, Result};
use crate::git::command::{self, Command};
use crate::git::parser::{self, Branch, DiffEntry, LogEntry, Remote};
use crate::git::shell::Shell;

/// Per-commit envelope handed to `git log --format`: each field is wrapped in
/// a fixed pseudo-XML tag with CDATA-escaped free text. `%H` is the full
/// hash, `%B` the raw body, `%aN` the author name, `%at` the Unix timestamp.
const LOG_FORMAT: &str = "\"<entry><hash><![CDATA[%H]]></hash><message><![CDATA[%B]]></message><authorName><![CDATA[%aN]]></authorName><authorDate><![CDATA[%at]]></authorDate></entry>\"";

/// High-level git operations: builds commands, executes them through the
/// [`Shell`], and parses the output into typed records.
///
/// An instance is a point-in-time view of one repository. Idempotent,
/// repository-invariant answers (remote lists, top-level directory) are
/// computed once and cached for the lifetime of the instance; there is no
/// invalidation. Single-threaded use only.
#[derive(Debug)]
pub struct Api<S> {
    shell: S,
    remotes: RefCell<Option<Vec<Remote>>>,
    verbose_remotes: RefCell<Option<Vec<Remote>>>,
    top_level: RefCell<Option<String>>,
}

impl<S: Shell> Api<S> {
    pub fn new(shell: S) -> Self {
        Self {
            shell,
            remotes: RefCell::new(None),
            verbose_remotes: RefCell::new(None),
            top_level: RefCell::new(None),
        }
    }

    /// Commits in `from..to`, oldest first, merges excluded. `to` defaults
    /// to `head`.
    ///
    /// The output is fully captured before parsing; the returned iterator is
    /// a finite, forward-only sequence over the decoded entries.
    pub fn log(&self, from: &str, to: Option<&str>) -> Result<impl Iterator<Item = LogEntry>> {
        let to = to.unwrap_or("head");
        let command = Command::new()
            .with_argument("log")
            .with_option_value("format", LOG_FORMAT)
            .with_option("no-merges")
            .with_option("date-order")
            .with_option("reverse")
            .with_argument(format!("{from}..{to}"));

        let lines = self.shell.exec(&command)?;
        Ok(parser::parse_log(&lines)?.into_iter())
    }

    /// `git checkout -b <branch>`. Failures propagate unchanged.
    pub fn create_branch(&self, branch: &str) -> Result<()> {
        let command = Command::new()
            .with_argument("checkout")
            .with_short_option("b")
            .with_argument(branch);
        self.shell.exec(&command)?;
        Ok(())
    }

    /// `git checkout <branch>`. Failures propagate unchanged.
    pub fn switch_branch(&self, branch: &str) -> Result<()> {
        let command = Command::new().with_argument("checkout").with_argument(branch);
        self.shell.exec(&command)?;
        Ok(())
    }

    /// Configured remotes, cached per instance.
    ///
    /// Verbose mode parses the full identity (owner, repo, host, direction)
    /// and fails with [`GitError::NoRemoteConfigured`] when no line parses.
    pub fn remotes(&self, verbose: bool) -> Result<Vec<Remote>> {
        if verbose {
            if let Some(cached) = self.verbose_remotes.borrow().as_ref() {
                return Ok(cached.clone());
            }

            let command = Command::new()
                .with_argument("remote")
                .with_short_option("v")
                .with_stderr_to("/dev/null");
            let remotes = parser::parse_verbose_remotes(&self.shell.exec(&command)?)?;

            *self.verbose_remotes.borrow_mut() = Some(remotes.clone());
            return Ok(remotes);
        }

        if let Some(cached) = self.remotes.borrow().as_ref() {
            return Ok(cached.clone());
        }

        let command = Command::new()
            .with_argument("remote")
            .with_stderr_to("/dev/null");
        let remotes = parser::parse_remotes(&self.shell.exec(&command)?);

        *self.remotes.borrow_mut() = Some(remotes.clone());
        Ok(remotes)
    }

    /// List branches, optionally including remote-tracking ones and
    /// optionally filtered through `grep <pattern>`.
    ///
    /// grep exits 1 on zero matches; with a non-empty pattern that is a
    /// successful empty-or-partial result, not a failure. Any other non-zero
    /// exit is re-raised.
    pub fn branches(&self, pattern: &str, with_remotes: bool) -> Result<Vec<Branch>> {
        let mut command = Command::new().with_argument("branch");
        if with_remotes {
            command = command.with_short_option("a");
        }
        if !pattern.is_empty() {
            command = command.pipe(Command::program("grep").with_argument(command::quote(pattern)));
        }

        let lines = match self.shell.exec(&command) {
            Ok(lines) => lines,
            Err(GitError::ExecutionFailed { code: 1, output, .. }) if !pattern.is_empty() => output,
            Err(other) => return Err(other),
        };

        let mut remote_names: Vec<String> = Vec::new();
        for remote in self.remotes(true)? {
            if !remote_names.contains(&remote.remote) {
                remote_names.push(remote.remote);
            }
        }

        parser::parse_branches(&lines, &remote_names)
    }

    /// The currently checked-out branch, or `None` when nothing is marked
    /// current.
    pub fn current_branch(&self) -> Result<Option<Branch>> {
        Ok(self
            .branches("* ", true)?
            .into_iter()
            .find(|branch| branch.current))
    }

    /// Best-effort guess at the branch this one was forked from: the last
    /// ref named in the decoration group of the nearest decorated ancestor.
    ///
    /// Known to lie when decorations are stale or absent; never treat the
    /// answer as authoritative ancestry.
    pub fn parent_branch(&self) -> Result<Option<String>> {
        let command = Command::new()
            .with_argument("log")
            .with_option("decorate")
            .with_option("simplify-by-decoration")
            .with_stderr_to("/dev/null")
            .pipe(Command::program("grep").with_argument(command::quote("^commit")));

        let lines = self.shell.exec(&command)?;
        // First line decorates HEAD itself; the parent ref, if any, is named
        // in the second decoration group.
        let Some(line) = lines.get(1) else {
            return Ok(None);
        };
        let Some(group) = decoration_group(line) else {
            return Ok(None);
        };

        Ok(group.rsplit(',').next().map(|name| name.trim().to_string()))
    }

    /// Repository root from `git rev-parse --show-toplevel`, cached per
    /// instance.
    pub fn top_level_directory(&self) -> Result<String> {
        if let Some(cached) = self.top_level.borrow().as_ref() {
            return Ok(cached.clone());
        }

        let command = Command::new()
            .with_argument("rev-parse")
            .with_option("show-toplevel")
            .with_stderr_to("/dev/null");
        let lines = self.shell.exec(&command)?;
        let directory = lines.last().cloned().unwrap_or_default();

        *self.top_level.borrow_mut() = Some(directory.clone());
        Ok(directory)
    }

    /// Name-and-status diff of the working tree against `to`, or against the
    /// default comparison target when `to` is empty.
    pub fn diff(&self, to: Option<&str>) -> Result<Vec<DiffEntry>> {
        let mut command = Command::new().with_argument("diff");
        if let Some(to) = to.filter(|to| !to.is_empty()) {
            command = command.with_argument(to);
        }
        command = command.with_option("name-status");

        let lines = self.shell.exec(&command)?;
        parser::parse_diff(&lines)
    }
}

/// Extract the parenthesised decoration group from a `commit <hash> (...)`
/// line.
fn decoration_group(line: &str) -> Option<&str> {
    let start = line.find('(')?;
    let end = line.rfind(')')?;
    (end > start).then(|| &line[start + 1..end])
}
