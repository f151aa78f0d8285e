//! Scripted command runner shared by unit tests

use std::cell::RefCell;
use std::collections::VecDeque;

use crate::error::{ProvenvError, Result};
use crate::exec::{CommandOutput, CommandRunner, CommandSpec};

/// One scripted response for a [`ScriptedRunner`]
pub enum Script {
    /// Return this output
    Output(CommandOutput),
    /// Fail to spawn
    SpawnError(String),
}

impl Script {
    pub fn ok(stdout: &str) -> Self {
        Self::Output(CommandOutput {
            code: Some(0),
            stdout: stdout.to_string(),
            stderr: String::new(),
        })
    }

    pub fn fail(code: i32, stderr: &str) -> Self {
        Self::Output(CommandOutput {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.to_string(),
        })
    }
}

/// Command runner that replays scripted outputs and records invocations
#[derive(Default)]
pub struct ScriptedRunner {
    scripts: RefCell<VecDeque<Script>>,
    invocations: RefCell<Vec<CommandSpec>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, script: Script) {
        self.scripts.borrow_mut().push_back(script);
    }

    /// Rendered command lines, in invocation order
    pub fn commands(&self) -> Vec<String> {
        self.invocations
            .borrow()
            .iter()
            .map(CommandSpec::rendered)
            .collect()
    }

    fn next(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        self.invocations.borrow_mut().push(spec.clone());
        match self.scripts.borrow_mut().pop_front() {
            Some(Script::Output(output)) => Ok(output),
            Some(Script::SpawnError(reason)) => Err(ProvenvError::SpawnFailed {
                program: spec.program.clone(),
                reason,
            }),
            // Unscripted commands succeed silently
            None => Ok(CommandOutput {
                code: Some(0),
                stdout: String::new(),
                stderr: String::new(),
            }),
        }
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        self.next(spec)
    }

    fn run_streaming(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        self.next(spec)
    }
}
