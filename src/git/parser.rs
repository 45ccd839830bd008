use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Deserialize;

use crate::error::{GitError, Result};

/// `<alias>\s+<user@host>:<owner>/<repo>.git (fetch|push)`
static VERBOSE_REMOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z0-9]+)\s+([^:]+):([^/]+)/(.*)\.git \((fetch|push)\)$")
        .expect("verbose remote pattern is valid")
});

/// One commit decoded from the pseudo-XML log envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub hash: String,
    pub message: String,
    pub author_name: String,
    pub author_date: DateTime<Utc>,
}

/// A local or remote-tracking branch. `remote` is `None` for local branches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub name: String,
    pub remote: Option<String>,
    pub current: bool,
}

/// Transfer direction of a verbose remote line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteDirection {
    Fetch,
    Push,
}

/// A configured remote. The identity fields are present only when parsed
/// from verbose (`git remote -v`) output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remote {
    pub remote: String,
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub user_host: Option<String>,
    pub direction: Option<RemoteDirection>,
}

impl Remote {
    /// Remote known by alias only, from plain `git remote` output.
    pub fn plain(remote: impl Into<String>) -> Self {
        Self {
            remote: remote.into(),
            owner: None,
            repo: None,
            user_host: None,
            direction: None,
        }
    }

    /// Fully-identified remote from one verbose output line.
    pub fn verbose(
        remote: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
        user_host: impl Into<String>,
        direction: RemoteDirection,
    ) -> Self {
        Self {
            remote: remote.into(),
            owner: Some(owner.into()),
            repo: Some(repo.into()),
            user_host: Some(user_host.into()),
            direction: Some(direction),
        }
    }

    /// Clone URL; only available for remotes parsed from verbose output.
    pub fn url(&self) -> Option<String> {
        let user_host = self.user_host.as_deref()?;
        Some(format!(
            "{}:{}/{}.git",
            user_host,
            self.owner.as_deref().unwrap_or_default(),
            self.repo.as_deref().unwrap_or_default()
        ))
    }
}

/// One `--name-status` diff line: a change code and a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffEntry {
    pub state: char,
    pub file: String,
}

impl DiffEntry {
    /// Parse one `<state><whitespace><path>` line. The path is kept verbatim,
    /// embedded spaces included.
    pub fn from_line(line: &str) -> Result<Self> {
        let (code, rest) = line
            .split_once(|c: char| c.is_whitespace())
            .ok_or_else(|| {
                GitError::MalformedOutput(format!("diff line without status separator: {line:?}"))
            })?;
        let state = code.chars().next().ok_or_else(|| {
            GitError::MalformedOutput(format!("diff line without status code: {line:?}"))
        })?;

        Ok(Self {
            state,
            file: rest.trim_start().to_string(),
        })
    }
}

// Wire shape of the pseudo-XML log output: a repeating `entry` element with
// CDATA-wrapped text children.
#[derive(Debug, Deserialize)]
struct LogDocument {
    #[serde(default)]
    entry: Vec<RawLogEntry>,
}

#[derive(Debug, Deserialize)]
struct RawLogEntry {
    hash: String,
    message: String,
    #[serde(rename = "authorName")]
    author_name: String,
    #[serde(rename = "authorDate")]
    author_date: String,
}

impl RawLogEntry {
    fn into_entry(self) -> Result<LogEntry> {
        let seconds: i64 = self.author_date.trim().parse().map_err(|_| {
            GitError::MalformedOutput(format!("invalid author date: {:?}", self.author_date))
        })?;
        let author_date = DateTime::from_timestamp(seconds, 0).ok_or_else(|| {
            GitError::MalformedOutput(format!("author date out of range: {seconds}"))
        })?;

        Ok(LogEntry {
            hash: self.hash,
            message: self.message,
            author_name: self.author_name,
            author_date,
        })
    }
}

/// Parse pseudo-XML log output into commits, in document order.
///
/// The captured lines are treated as one document with a repeating `entry`
/// element. Empty output yields an empty vec; a document that fails to
/// decode is fatal for the whole call.
pub fn parse_log(lines: &[String]) -> Result<Vec<LogEntry>> {
    let body = lines.join("\n");
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let document: LogDocument = quick_xml::de::from_str(&format!("<log>{body}</log>"))
        .map_err(|e| GitError::MalformedOutput(format!("log entries: {e}")))?;

    document
        .entry
        .into_iter()
        .map(RawLogEntry::into_entry)
        .collect()
}

/// Parse plain `git remote` output: one alias per line, taken verbatim.
pub fn parse_remotes(lines: &[String]) -> Vec<Remote> {
    lines.iter().map(|line| Remote::plain(line.as_str())).collect()
}

/// Parse verbose `git remote -v` output.
///
/// Lines not matching the verbose pattern are silently dropped; that
/// leniency is specific to this parser. Duplicate aliases (one fetch line,
/// one push line per remote) are preserved. Zero parsed remotes is an error.
pub fn parse_verbose_remotes(lines: &[String]) -> Result<Vec<Remote>> {
    let remotes: Vec<Remote> = lines
        .iter()
        .filter_map(|line| {
            let captures = VERBOSE_REMOTE.captures(line.trim())?;
            let direction = match &captures[5] {
                "push" => RemoteDirection::Push,
                _ => RemoteDirection::Fetch,
            };
            Some(Remote::verbose(
                &captures[1],
                &captures[3],
                &captures[4],
                &captures[2],
                direction,
            ))
        })
        .collect();

    if remotes.is_empty() {
        return Err(GitError::NoRemoteConfigured);
    }
    Ok(remotes)
}

/// Parse `git branch [-a]` output, disambiguating remote-tracking branches
/// against the given remote aliases.
///
/// A branch belongs to a remote when its line contains `<alias>/<namespace>/`;
/// the literal `remotes/<alias>/` prefix and the `* ` current marker are then
/// stripped to get the display name. Output order mirrors input order.
pub fn parse_branches(lines: &[String], remote_names: &[String]) -> Result<Vec<Branch>> {
    let prefix = if remote_names.is_empty() {
        None
    } else {
        let alternatives = remote_names
            .iter()
            .map(|name| regex::escape(name))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!("({alternatives})/[^/]+/"))
            .map_err(|e| GitError::MalformedOutput(format!("remote alias pattern: {e}")))?;
        Some(pattern)
    };

    let branches = lines
        .iter()
        .map(|line| {
            let remote = prefix
                .as_ref()
                .and_then(|pattern| pattern.captures(line))
                .map(|captures| captures[1].to_string());
            let current = line.contains("* ");

            let mut name = line.replace("* ", "");
            if let Some(alias) = &remote {
                name = name.replace(&format!("remotes/{alias}/"), "");
            }

            Branch {
                name: name.trim_start().to_string(),
                remote,
                current,
            }
        })
        .collect();

    Ok(branches)
}

/// Parse `git diff --name-status` output. Blank lines are skipped; a line
/// without a status separator is malformed.
pub fn parse_diff(lines: &[String]) -> Result<Vec<DiffEntry>> {
    lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| DiffEntry::from_line(line))
        .collect()
}
