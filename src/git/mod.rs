pub mod api;
pub mod command;
pub mod parser;
pub mod shell;

// Re-export commonly used types
pub use api::Api;
pub use command::{Command, quote};
pub use parser::{
    Branch, DiffEntry, LogEntry, Remote, RemoteDirection, parse_branches, parse_diff, parse_log,
    parse_remotes, parse_verbose_remotes,
};
pub use shell::{Shell, SystemShell};
