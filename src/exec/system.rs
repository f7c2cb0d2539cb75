// Copyright 2024-2026 Aldar Deploy Contributors
// SPDX-License-Identifier: Apache-2.0

//! [`CommandRunner`] backed by real child processes.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::{CommandOutput, CommandRunner, CommandSpec, ExecError, Input, OutputMode};

/// Spawns processes with `tokio::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, ExecError> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args).kill_on_drop(true);

        if let Some(ref dir) = spec.current_dir {
            cmd.current_dir(dir);
        }

        cmd.stdin(match spec.input {
            Input::Null => Stdio::null(),
            Input::Piped(_) => Stdio::piped(),
            Input::Inherit => Stdio::inherit(),
        });

        match spec.output {
            OutputMode::Capture => {
                cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
            }
            OutputMode::Stream => {
                cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
            }
        }

        let spawn_err = |source| ExecError::Spawn {
            program: spec.program.clone(),
            source,
        };

        let mut child = cmd.spawn().map_err(spawn_err)?;

        let mut stdin_err = None;
        if let Input::Piped(ref payload) = spec.input {
            if let Some(mut stdin) = child.stdin.take() {
                // An early exit closes the pipe; the child's status is reported instead.
                if let Err(source) = stdin.write_all(payload.as_bytes()).await {
                    tracing::debug!(program = %spec.program, error = %source, "stdin write failed");
                    stdin_err = Some(source);
                }
                // Closing stdin signals EOF to `kubectl apply -f -`.
                drop(stdin);
            }
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|source| ExecError::Wait {
                program: spec.program.clone(),
                source,
            })?;

        let output = CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        match stdin_err {
            Some(source) if output.success() => Err(ExecError::Stdin {
                program: spec.program.clone(),
                source,
            }),
            _ => Ok(output),
        }
    }

    fn locate(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }
}
