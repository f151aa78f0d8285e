//! Convergence stamp written into the venv after a successful apply
//!
//! The stamp holds the blake3 digest of the manifest that last converged
//! this venv. Matching stamp + present packages = nothing to do.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{ProvenvError, Result};

const STAMP_FILE: &str = ".provenv-stamp";

pub fn path(venv: &Path) -> PathBuf {
    venv.join(STAMP_FILE)
}

/// Digest recorded by the last successful apply, if any
pub fn read(venv: &Path) -> Option<String> {
    let content = fs::read_to_string(path(venv)).ok()?;
    let digest = content.trim();
    if digest.is_empty() {
        None
    } else {
        Some(digest.to_string())
    }
}

/// Atomically record the manifest digest
///
/// Written via a temp file in the venv so an interrupted apply never
/// leaves a truncated stamp that would mask a half-provisioned state.
pub fn write(venv: &Path, digest: &str) -> Result<()> {
    let stamp_path = path(venv);
    let mut file =
        tempfile::NamedTempFile::new_in(venv).map_err(|e| ProvenvError::FileWriteFailed {
            path: stamp_path.display().to_string(),
            reason: e.to_string(),
        })?;
    writeln!(file, "{}", digest).map_err(|e| ProvenvError::FileWriteFailed {
        path: stamp_path.display().to_string(),
        reason: e.to_string(),
    })?;
    file.persist(&stamp_path)
        .map_err(|e| ProvenvError::FileWriteFailed {
            path: stamp_path.display().to_string(),
            reason: e.to_string(),
        })?;
    Ok(())
}
