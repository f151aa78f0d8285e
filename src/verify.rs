//! Machine-checkable post-install verification
//!
//! Produces a structured report instead of a scrollback of versions for
//! human eyes. Every expected artifact is checked; any failure turns
//! into a non-zero exit in the calling command.

use serde::Serialize;

use crate::apt;
use crate::config::Manifest;
use crate::error::Result;
use crate::exec::{CommandRunner, CommandSpec};
use crate::pip;
use crate::venv;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Fail,
}

/// One verified expectation
#[derive(Debug, Clone, Serialize)]
pub struct Check {
    pub name: String,
    pub expected: String,
    pub actual: String,
    pub status: CheckStatus,
}

impl Check {
    fn new(name: impl Into<String>, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        let expected = expected.into();
        let actual = actual.into();
        let status = if expected == actual {
            CheckStatus::Pass
        } else {
            CheckStatus::Fail
        };
        Self {
            name: name.into(),
            expected,
            actual,
            status,
        }
    }

    fn failed(
        name: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            expected: expected.into(),
            actual: actual.into(),
            status: CheckStatus::Fail,
        }
    }
}

/// Full verification report for an environment
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub environment: String,
    pub checks: Vec<Check>,
}

impl Report {
    pub fn passed(&self) -> bool {
        self.failed_count() == 0
    }

    pub fn failed_count(&self) -> usize {
        self.checks
            .iter()
            .filter(|check| check.status == CheckStatus::Fail)
            .count()
    }

    pub fn total(&self) -> usize {
        self.checks.len()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Run every check the manifest implies
pub fn run(runner: &dyn CommandRunner, manifest: &Manifest) -> Result<Report> {
    let mut checks = Vec::new();

    check_python_version(runner, manifest, &mut checks);
    check_os_packages(runner, manifest, &mut checks)?;
    check_pins(runner, manifest, &mut checks);
    check_imports(runner, manifest, &mut checks);

    Ok(Report {
        environment: manifest.name.clone(),
        checks,
    })
}

fn check_python_version(runner: &dyn CommandRunner, manifest: &Manifest, checks: &mut Vec<Check>) {
    let actual = match venv::python_version(runner, &manifest.venv) {
        Ok(version) => version,
        Err(err) => {
            checks.push(Check::failed(
                "python version",
                manifest.python.as_str(),
                err.to_string(),
            ));
            return;
        }
    };
    checks.push(Check::new(
        "python version",
        manifest.python.as_str(),
        actual,
    ));
}

fn check_os_packages(
    runner: &dyn CommandRunner,
    manifest: &Manifest,
    checks: &mut Vec<Check>,
) -> Result<()> {
    for package in manifest.all_os_packages() {
        let actual = if apt::is_installed(runner, &package)? {
            "installed"
        } else {
            "missing"
        };
        checks.push(Check::new(
            format!("apt package {}", package),
            "installed",
            actual,
        ));
    }
    Ok(())
}

fn check_pins(runner: &dyn CommandRunner, manifest: &Manifest, checks: &mut Vec<Check>) {
    let pins = manifest.pinned_packages();
    if pins.is_empty() {
        return;
    }

    let frozen = match pip::freeze(runner, &manifest.venv) {
        Ok(frozen) => frozen,
        Err(err) => {
            let reason = err.to_string();
            for pin in &pins {
                checks.push(Check::failed(
                    format!("pip pin {}", pin.name),
                    pin.version.clone(),
                    reason.clone(),
                ));
            }
            return;
        }
    };

    for pin in &pins {
        let actual = frozen
            .get(&pin.normalized_name())
            .cloned()
            .unwrap_or_else(|| "not installed".to_string());
        checks.push(Check::new(
            format!("pip pin {}", pin.name),
            pin.version.clone(),
            actual,
        ));
    }
}

fn check_imports(runner: &dyn CommandRunner, manifest: &Manifest, checks: &mut Vec<Check>) {
    let python = venv::python_path(&manifest.venv);

    for package in &manifest.isolated {
        let module = package.import_name();
        let name = format!("import {}", module);

        if !python.exists() {
            checks.push(Check::failed(name, "importable", "venv python missing"));
            continue;
        }

        let spec = CommandSpec::new(python.display().to_string())
            .arg("-c")
            .arg(format!("import {}", module));
        let actual = match runner.run(&spec) {
            Ok(output) if output.success() => "importable".to_string(),
            // Native loading errors land on the last stderr line
            Ok(output) => output
                .stderr
                .lines()
                .last()
                .unwrap_or("import failed")
                .trim()
                .to_string(),
            Err(err) => err.to_string(),
        };
        checks.push(Check::new(name, "importable", actual));
    }
}
