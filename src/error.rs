use std::io;
use thiserror::Error;

/// Errors that can occur while driving the git command line
#[derive(Debug, Error)]
pub enum GitError {
    /// The external process exited non-zero. Carries whatever stdout was
    /// captured before the failure so callers can salvage partial results.
    #[error("command `{command}` exited with code {code}")]
    ExecutionFailed {
        command: String,
        code: i32,
        output: Vec<String>,
    },

    #[error("no git remote configured")]
    NoRemoteConfigured,

    #[error("failed to parse git output: {0}")]
    MalformedOutput(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for git operations
pub type Result<T> = std::result::Result<T, GitError>;
