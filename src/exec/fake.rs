// Copyright 2024-2026 Aldar Deploy Contributors
// SPDX-License-Identifier: Apache-2.0

//! Scripted [`CommandRunner`] for exercising orchestration without
//! touching Azure, the cluster or Docker.
//!
//! Responses are matched by command-line prefix, first registered rule
//! wins. A rule holding several responses hands them out in order and then
//! keeps repeating the last one, which is how readiness polling is scripted.
//! Unmatched commands succeed with empty output.

use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{CommandOutput, CommandRunner, CommandSpec, ExecError};

struct Rule {
    prefix: String,
    responses: VecDeque<CommandOutput>,
}

impl Rule {
    fn next(&mut self) -> CommandOutput {
        if self.responses.len() > 1 {
            self.responses.pop_front().unwrap_or_default()
        } else {
            self.responses.front().cloned().unwrap_or_default()
        }
    }
}

/// Recording, scripted runner.
#[derive(Default)]
pub struct FakeRunner {
    rules: Mutex<Vec<Rule>>,
    missing: Mutex<HashSet<String>>,
    calls: Mutex<Vec<CommandSpec>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer commands starting with `prefix` with `output`.
    pub fn respond(&self, prefix: impl Into<String>, output: CommandOutput) -> &Self {
        self.respond_seq(prefix, vec![output])
    }

    /// Answer successive matching commands with `outputs` in order.
    pub fn respond_seq(&self, prefix: impl Into<String>, outputs: Vec<CommandOutput>) -> &Self {
        self.rules.lock().push(Rule {
            prefix: prefix.into(),
            responses: outputs.into(),
        });
        self
    }

    /// Make commands starting with `prefix` exit non-zero.
    pub fn fail(&self, prefix: impl Into<String>, code: i32, stderr: &str) -> &Self {
        self.respond(prefix, CommandOutput::failed(code, stderr))
    }

    /// Hide `program` from PATH lookups.
    pub fn missing_tool(&self, program: &str) -> &Self {
        self.missing.lock().insert(program.to_string());
        self
    }

    /// Every command run so far, in order.
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().clone()
    }

    /// Command lines of every command run so far, in order.
    pub fn command_lines(&self) -> Vec<String> {
        self.calls.lock().iter().map(CommandSpec::command_line).collect()
    }

    /// Index of the first call whose command line starts with `prefix`.
    pub fn position(&self, prefix: &str) -> Option<usize> {
        self.calls
            .lock()
            .iter()
            .position(|c| c.command_line().starts_with(prefix))
    }

    /// Number of calls whose command line starts with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.command_line().starts_with(prefix))
            .count()
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, ExecError> {
        self.calls.lock().push(spec.clone());
        let line = spec.command_line();
        let mut rules = self.rules.lock();
        let output = rules
            .iter_mut()
            .find(|r| line.starts_with(&r.prefix))
            .map(Rule::next)
            .unwrap_or_else(|| CommandOutput::ok(""));
        Ok(output)
    }

    fn locate(&self, program: &str) -> Option<PathBuf> {
        if self.missing.lock().contains(program) {
            None
        } else {
            Some(PathBuf::from("/usr/bin").join(program))
        }
    }
}
