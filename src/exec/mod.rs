// Copyright 2024-2026 Aldar Deploy Contributors
// SPDX-License-Identifier: Apache-2.0

//! External command execution.
//!
//! Every `az`, `kubectl` and `docker` invocation goes through
//! [`CommandRunner`], so the orchestration sequence can run against
//! [`FakeRunner`] in tests and [`SystemRunner`] in production.

pub mod fake;
pub mod system;

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

pub use fake::FakeRunner;
pub use system::SystemRunner;

/// Where a child process writes its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Collect stdout and stderr into [`CommandOutput`].
    Capture,
    /// Pass output straight through to the terminal.
    Stream,
}

/// What a child process reads on stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Null,
    /// Write this payload, then close stdin.
    Piped(String),
    /// Share the terminal (interactive prompts).
    Inherit,
}

/// A fully described external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub input: Input,
    pub output: OutputMode,
    pub current_dir: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            input: Input::Null,
            output: OutputMode::Capture,
            current_dir: None,
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn stdin(mut self, payload: impl Into<String>) -> Self {
        self.input = Input::Piped(payload.into());
        self
    }

    #[must_use]
    pub fn streamed(mut self) -> Self {
        self.output = OutputMode::Stream;
        self
    }

    #[must_use]
    pub fn interactive(mut self) -> Self {
        self.input = Input::Inherit;
        self.output = OutputMode::Stream;
        self
    }

    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Space-joined command line, used for logging and fake matching.
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

/// Result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Convert a non-zero exit into [`ExecError::NonZeroExit`].
    pub fn into_result(self, spec: &CommandSpec) -> Result<CommandOutput, ExecError> {
        if self.success() {
            Ok(self)
        } else {
            Err(ExecError::NonZeroExit {
                command: spec.command_line(),
                code: self.code,
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

/// Errors raised while running an external command.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed waiting for '{program}': {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write stdin for '{program}': {source}")]
    Stdin {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' exited with {}{}", describe_code(.code), describe_stderr(.stderr))]
    NonZeroExit {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("code {}", c),
        None => "signal".to_string(),
    }
}

fn describe_stderr(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {}", stderr)
    }
}

/// Executes external commands one at a time.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the command to completion. A non-zero exit is not an error here.
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, ExecError>;

    /// Resolve `program` on PATH.
    fn locate(&self, program: &str) -> Option<PathBuf>;
}

/// Run a command and fail on a non-zero exit.
pub async fn run_checked(
    runner: &dyn CommandRunner,
    spec: &CommandSpec,
) -> Result<CommandOutput, ExecError> {
    tracing::debug!(command = %spec, "running");
    let output = runner.run(spec).await?;
    if !output.success() {
        tracing::debug!(command = %spec, code = ?output.code, "command failed");
    }
    output.into_result(spec)
}

#[cfg(test)]
#[path = "exec_tests.rs"]
mod tests;
