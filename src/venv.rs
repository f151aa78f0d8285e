//! Virtual environment lifecycle (create, remove, interpreter probe)

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Manifest;
use crate::error::{ProvenvError, Result};
use crate::exec::{CommandRunner, CommandSpec, expect_success};

/// Path of the interpreter inside a venv
pub fn python_path(venv: &Path) -> PathBuf {
    venv.join("bin").join("python")
}

/// Whether a usable venv exists at the manifest path
///
/// The pyvenv.cfg marker is what `python -m venv` writes; a bare
/// directory (e.g. a half-finished create) does not count.
pub fn exists(venv: &Path) -> bool {
    venv.join("pyvenv.cfg").is_file() && python_path(venv).exists()
}

/// Create the venv with the manifest interpreter
///
/// Fails if the interpreter is missing or the parent is unwritable. On
/// failure the half-created directory is removed so a rerun starts clean.
pub fn create(runner: &dyn CommandRunner, manifest: &Manifest) -> Result<()> {
    if let Some(parent) = manifest.venv.parent() {
        fs::create_dir_all(parent).map_err(|e| ProvenvError::IoError {
            message: format!("Failed to create {}: {}", parent.display(), e),
        })?;
    }

    let spec = CommandSpec::new(manifest.python_program())
        .args(["-m", "venv"])
        .arg(manifest.venv.display().to_string());
    let output = runner.run(&spec)?;

    if let Err(err) = expect_success(&spec, &output) {
        if manifest.venv.exists() && !exists(&manifest.venv) {
            let _ = fs::remove_dir_all(&manifest.venv);
        }
        return Err(err);
    }
    Ok(())
}

/// Remove an existing venv for destroy-then-create recreation
///
/// Refuses to remove anything that is not a venv, so a mistyped manifest
/// path cannot delete arbitrary directories.
pub fn remove(venv: &Path) -> Result<()> {
    if !venv.exists() {
        return Ok(());
    }
    if !venv.join("pyvenv.cfg").is_file() {
        return Err(ProvenvError::NotAVenv {
            path: venv.display().to_string(),
        });
    }
    fs::remove_dir_all(venv).map_err(|e| ProvenvError::IoError {
        message: format!("Failed to remove {}: {}", venv.display(), e),
    })
}

/// Interpreter version inside the venv, as major.minor
pub fn python_version(runner: &dyn CommandRunner, venv: &Path) -> Result<String> {
    let python = python_path(venv);
    if !python.exists() {
        return Err(ProvenvError::VenvPythonMissing {
            path: python.display().to_string(),
        });
    }

    let spec = CommandSpec::new(python.display().to_string()).arg("--version");
    let output = runner.run(&spec)?;
    expect_success(&spec, &output)?;

    // "Python 3.11.9" (older interpreters printed it on stderr)
    let reported = if output.stdout.trim().is_empty() {
        output.stderr.trim().to_string()
    } else {
        output.stdout.trim().to_string()
    };

    let version = reported
        .strip_prefix("Python ")
        .map(str::trim)
        .ok_or_else(|| ProvenvError::UnexpectedOutput {
            command: spec.rendered(),
            reason: format!("expected 'Python X.Y.Z', got '{}'", reported),
        })?;

    let mut parts = version.split('.');
    match (parts.next(), parts.next()) {
        (Some(major), Some(minor)) if !major.is_empty() && !minor.is_empty() => {
            Ok(format!("{}.{}", major, minor))
        }
        _ => Err(ProvenvError::UnexpectedOutput {
            command: spec.rendered(),
            reason: format!("unparseable version '{}'", version),
        }),
    }
}
