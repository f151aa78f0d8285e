//! pip operations inside the managed venv

use std::collections::BTreeMap;
use std::path::Path;

use crate::config::{IsolatedPackage, Pin};
use crate::error::Result;
use crate::exec::{CommandRunner, CommandSpec, expect_success};
use crate::venv;

fn pip_spec(venv_path: &Path) -> CommandSpec {
    CommandSpec::new(venv::python_path(venv_path).display().to_string()).args(["-m", "pip"])
}

/// Install exact pins in one batch (used for the packaging bootstrap)
///
/// Pinning pip/setuptools/wheel first gives a known resolver baseline
/// before any application dependency is considered.
pub fn install_pins(
    runner: &dyn CommandRunner,
    venv_path: &Path,
    pins: &[Pin],
    verbose: bool,
) -> Result<()> {
    if pins.is_empty() {
        return Ok(());
    }
    let spec = pip_spec(venv_path)
        .arg("install")
        .args(pins.iter().map(ToString::to_string));
    let output = if verbose {
        runner.run_streaming(&spec)?
    } else {
        runner.run(&spec)?
    };
    expect_success(&spec, &output)
}

/// Install a requirements file with build isolation forced
///
/// `--use-pep517` makes every sdist build under its own declared backend
/// instead of falling back to a legacy setup.py invocation that the
/// pinned toolchain may not support.
pub fn install_requirements(
    runner: &dyn CommandRunner,
    venv_path: &Path,
    requirements: &Path,
    verbose: bool,
) -> Result<()> {
    let spec = pip_spec(venv_path)
        .args(["install", "--use-pep517", "-r"])
        .arg(requirements.display().to_string());
    let output = if verbose {
        runner.run_streaming(&spec)?
    } else {
        runner.run(&spec)?
    };
    expect_success(&spec, &output)
}

/// Install one native-heavy package on its own, with a verbose build log
///
/// Always streams: when one of these fails, the compiler output is the
/// diagnostic, and it must be attributable to exactly one package.
pub fn install_isolated(
    runner: &dyn CommandRunner,
    venv_path: &Path,
    package: &IsolatedPackage,
) -> Result<()> {
    let spec = pip_spec(venv_path)
        .args(["install", "-v", "--use-pep517"])
        .arg(package.pin.to_string());
    let output = runner.run_streaming(&spec)?;
    expect_success(&spec, &output)
}

/// Installed distributions per `pip freeze`, keyed by normalized name
pub fn freeze(runner: &dyn CommandRunner, venv_path: &Path) -> Result<BTreeMap<String, String>> {
    let spec = pip_spec(venv_path).arg("freeze");
    let output = runner.run(&spec)?;
    expect_success(&spec, &output)?;

    let mut installed = BTreeMap::new();
    for line in output.stdout.lines() {
        let line = line.trim();
        // Editable and direct-URL installs have no usable version pin
        if line.is_empty() || line.starts_with('-') || line.contains(" @ ") {
            continue;
        }
        if let Ok(pin) = Pin::parse(line) {
            installed.insert(pin.normalized_name(), pin.version);
        }
    }
    Ok(installed)
}

/// Purge pip's wheel/http cache
pub fn cache_purge(runner: &dyn CommandRunner, venv_path: &Path) -> Result<()> {
    let spec = pip_spec(venv_path).args(["cache", "purge"]);
    // pip exits non-zero when the cache is already empty or disabled;
    // either way the post-state is what we wanted.
    let _ = runner.run(&spec)?;
    Ok(())
}

/// Size of pip's cache directory, for the cleanup report
pub fn cache_size_bytes() -> u64 {
    let Some(cache_dir) = dirs::cache_dir().map(|dir| dir.join("pip")) else {
        return 0;
    };
    if !cache_dir.is_dir() {
        return 0;
    }
    walkdir::WalkDir::new(cache_dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.metadata().ok())
        .filter(|meta| meta.is_file())
        .map(|meta| meta.len())
        .sum()
}
