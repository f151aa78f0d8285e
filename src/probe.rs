//! Observed host state, gathered before planning

use crate::apt;
use crate::config::Manifest;
use crate::error::Result;
use crate::exec::CommandRunner;
use crate::stamp;
use crate::venv;

/// What the host actually looks like right now
#[derive(Debug, Clone, Default)]
pub struct Observed {
    /// Manifest OS packages dpkg does not report as installed
    pub missing_packages: Vec<String>,
    /// Whether a usable venv exists at the manifest path
    pub venv_exists: bool,
    /// Manifest digest recorded by the last successful apply
    pub stamp: Option<String>,
}

/// Probe the host against the manifest
pub fn observe(runner: &dyn CommandRunner, manifest: &Manifest) -> Result<Observed> {
    let missing_packages = apt::missing(runner, &manifest.all_os_packages())?;
    let venv_exists = venv::exists(&manifest.venv);
    let stamp = if venv_exists {
        stamp::read(&manifest.venv)
    } else {
        None
    };

    Ok(Observed {
        missing_packages,
        venv_exists,
        stamp,
    })
}
