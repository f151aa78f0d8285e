//! Subprocess execution layer
//!
//! Every external effect (apt, dpkg, python, pip) goes through the
//! [`CommandRunner`] trait so that planning, probing and execution can be
//! exercised against a scripted runner in tests.

use std::process::{Command, Stdio};

use crate::error::{ProvenvError, Result};

/// A fully described subprocess invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Extra environment applied on top of the inherited one
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    #[allow(dead_code)]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Render the invocation for error messages and plan output
    pub fn rendered(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Captured result of a finished subprocess
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// Exit code, if the process exited normally
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    fn status_label(&self) -> String {
        match self.code {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Abstraction over subprocess execution
pub trait CommandRunner {
    /// Run a command capturing stdout/stderr.
    ///
    /// Returns `Ok` even when the command exits non-zero; callers decide
    /// whether a non-zero exit is an error via [`expect_success`].
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput>;

    /// Run a command streaming output to the operator's terminal.
    ///
    /// Used for the verbose native builds where the build log itself is
    /// the diagnostic artifact. Captured strings are empty.
    fn run_streaming(&self, spec: &CommandSpec) -> Result<CommandOutput>;
}

/// Fail with [`ProvenvError::CommandFailed`] unless the command succeeded
pub fn expect_success(spec: &CommandSpec, output: &CommandOutput) -> Result<()> {
    if output.success() {
        return Ok(());
    }
    Err(ProvenvError::CommandFailed {
        command: spec.rendered(),
        status: output.status_label(),
        stderr: output.stderr.trim_end().to_string(),
    })
}

/// Runner that spawns real processes with the provisioning environment applied
pub struct SystemRunner {
    /// Environment applied to every spawned process
    base_env: Vec<(String, String)>,
}

impl SystemRunner {
    pub fn new(extra_env: &[(String, String)]) -> Self {
        // Non-interactive, uncached, unbuffered: the environment the
        // provisioning contract requires for every subprocess.
        let mut base_env = vec![
            ("DEBIAN_FRONTEND".to_string(), "noninteractive".to_string()),
            ("PIP_NO_CACHE_DIR".to_string(), "off".to_string()),
            ("PYTHONUNBUFFERED".to_string(), "1".to_string()),
        ];
        base_env.extend(extra_env.iter().cloned());
        Self { base_env }
    }

    fn command(&self, spec: &CommandSpec) -> Command {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);
        for (key, value) in self.base_env.iter().chain(spec.env.iter()) {
            cmd.env(key, value);
        }
        cmd
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        let output = self
            .command(spec)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ProvenvError::SpawnFailed {
                program: spec.program.clone(),
                reason: e.to_string(),
            })?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn run_streaming(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        let status = self
            .command(spec)
            .stdin(Stdio::null())
            .status()
            .map_err(|e| ProvenvError::SpawnFailed {
                program: spec.program.clone(),
                reason: e.to_string(),
            })?;

        Ok(CommandOutput {
            code: status.code(),
            stdout: String::new(),
            stderr: String::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_rendered() {
        let spec = CommandSpec::new("apt-get")
            .arg("install")
            .args(["-y", "swig"]);
        assert_eq!(spec.rendered(), "apt-get install -y swig");
    }

    #[test]
    fn test_expect_success_passes_on_zero() {
        let spec = CommandSpec::new("true");
        let output = CommandOutput {
            code: Some(0),
            ..Default::default()
        };
        assert!(expect_success(&spec, &output).is_ok());
    }

    #[test]
    fn test_expect_success_reports_stderr() {
        let spec = CommandSpec::new("apt-get").arg("update");
        let output = CommandOutput {
            code: Some(100),
            stdout: String::new(),
            stderr: "E: Unable to fetch index\n".to_string(),
        };
        let err = expect_success(&spec, &output).unwrap_err();
        match err {
            ProvenvError::CommandFailed {
                command,
                status,
                stderr,
            } => {
                assert_eq!(command, "apt-get update");
                assert_eq!(status, "exit code 100");
                assert_eq!(stderr, "E: Unable to fetch index");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_system_runner_captures_output() {
        let runner = SystemRunner::new(&[]);
        let spec = CommandSpec::new("sh").args(["-c", "echo hello"]);
        let output = runner.run(&spec).unwrap();
        assert!(output.success());
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[test]
    fn test_system_runner_nonzero_exit_is_ok() {
        let runner = SystemRunner::new(&[]);
        let spec = CommandSpec::new("sh").args(["-c", "exit 3"]);
        let output = runner.run(&spec).unwrap();
        assert_eq!(output.code, Some(3));
        assert!(!output.success());
    }

    #[test]
    fn test_system_runner_applies_provisioning_env() {
        let runner = SystemRunner::new(&[("EXTRA_VAR".to_string(), "yes".to_string())]);
        let spec = CommandSpec::new("sh").args([
            "-c",
            "printf '%s %s %s' \"$DEBIAN_FRONTEND\" \"$PYTHONUNBUFFERED\" \"$EXTRA_VAR\"",
        ]);
        let output = runner.run(&spec).unwrap();
        assert_eq!(output.stdout, "noninteractive 1 yes");
    }

    #[test]
    fn test_system_runner_missing_program() {
        let runner = SystemRunner::new(&[]);
        let spec = CommandSpec::new("provenv-definitely-not-a-program");
        let err = runner.run(&spec).unwrap_err();
        assert!(matches!(err, ProvenvError::SpawnFailed { .. }));
    }
}
