use std::fmt;

/// Immutable, chainable description of an external-process invocation.
///
/// A `Command` is a pipeline of one or more stages; every `with_*` call
/// consumes the builder and returns the updated value, so a command handed to
/// a [`Shell`](crate::git::shell::Shell) is never mutated behind its back.
/// Building has no side effects: the command only renders to the string the
/// shell will run.
///
/// Values are rendered verbatim. Callers are responsible for shell-escaping
/// anything that needs it (see [`quote`]), e.g. grep patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    stages: Vec<Stage>,
}

/// One program invocation within a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Stage {
    program: String,
    tokens: Vec<Token>,
    stderr_to: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Argument(String),
    LongOption { name: String, value: Option<String> },
    ShortOption { name: String, value: Option<String> },
}

impl Command {
    /// New empty `git` invocation.
    pub fn new() -> Self {
        Self::program("git")
    }

    /// New empty invocation of an arbitrary program (e.g. `grep`).
    pub fn program(name: impl Into<String>) -> Self {
        Self {
            stages: vec![Stage {
                program: name.into(),
                tokens: Vec::new(),
                stderr_to: None,
            }],
        }
    }

    /// Append a positional argument to the last pipeline stage.
    pub fn with_argument(mut self, value: impl Into<String>) -> Self {
        self.last_stage().tokens.push(Token::Argument(value.into()));
        self
    }

    /// Append a valueless long option: `--name`.
    pub fn with_option(mut self, name: impl Into<String>) -> Self {
        self.last_stage().tokens.push(Token::LongOption {
            name: name.into(),
            value: None,
        });
        self
    }

    /// Append a long option with a value: `--name=value`.
    pub fn with_option_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.last_stage().tokens.push(Token::LongOption {
            name: name.into(),
            value: Some(value.into()),
        });
        self
    }

    /// Append a valueless short option: `-n`.
    pub fn with_short_option(mut self, name: impl Into<String>) -> Self {
        self.last_stage().tokens.push(Token::ShortOption {
            name: name.into(),
            value: None,
        });
        self
    }

    /// Append a short option with a value: `-n value`.
    pub fn with_short_option_value(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.last_stage().tokens.push(Token::ShortOption {
            name: name.into(),
            value: Some(value.into()),
        });
        self
    }

    /// Redirect the last stage's stderr, e.g. to `/dev/null`.
    pub fn with_stderr_to(mut self, target: impl Into<String>) -> Self {
        self.last_stage().stderr_to = Some(target.into());
        self
    }

    /// Feed this command's output into `next`, returning the whole pipeline.
    pub fn pipe(mut self, next: Command) -> Self {
        self.stages.extend(next.stages);
        self
    }

    /// Render the exact command line the shell executes. Rendering is
    /// deterministic: tokens appear in insertion order, stages are joined
    /// with the pipe operator.
    pub fn render(&self) -> String {
        self.stages
            .iter()
            .map(Stage::render)
            .collect::<Vec<_>>()
            .join(" | ")
    }

    fn last_stage(&mut self) -> &mut Stage {
        // stages is never empty: every constructor seeds one stage
        let last = self.stages.len() - 1;
        &mut self.stages[last]
    }
}

impl Default for Command {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl Stage {
    fn render(&self) -> String {
        let mut parts = vec![self.program.clone()];

        for token in &self.tokens {
            match token {
                Token::Argument(value) => parts.push(value.clone()),
                Token::LongOption { name, value: None } => parts.push(format!("--{name}")),
                Token::LongOption {
                    name,
                    value: Some(value),
                } => parts.push(format!("--{name}={value}")),
                Token::ShortOption { name, value: None } => parts.push(format!("-{name}")),
                Token::ShortOption {
                    name,
                    value: Some(value),
                } => {
                    parts.push(format!("-{name}"));
                    parts.push(value.clone());
                }
            }
        }

        if let Some(target) = &self.stderr_to {
            parts.push(format!("2>{target}"));
        }

        parts.join(" ")
    }
}

/// POSIX single-quote a value so the shell passes it through verbatim.
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
