//! Desired-state convergence planning
//!
//! The planner turns (manifest, observed host state) into an ordered
//! action list. Ordering mirrors the provisioning contract: OS packages
//! before the interpreter environment, packaging bootstrap before
//! application dependencies, native-heavy packages one at a time,
//! cleanup and stamp last.

use std::path::PathBuf;

use crate::config::{IsolatedPackage, Manifest, Pin};
use crate::error::Result;
use crate::probe::Observed;

/// One step of a convergence run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    RefreshPackageIndex,
    InstallOsPackages { packages: Vec<String> },
    CreateVenv { recreate: bool },
    UpgradeBootstrap { pins: Vec<Pin> },
    InstallRequirements { path: PathBuf },
    InstallIsolated { package: IsolatedPackage },
    CleanCaches,
    WriteStamp { digest: String },
}

impl Action {
    /// One-line summary shown in plan output and progress messages
    pub fn summary(&self) -> String {
        match self {
            Self::RefreshPackageIndex => "Refresh apt package index".to_string(),
            Self::InstallOsPackages { packages } => {
                format!(
                    "Install {} OS package{}",
                    packages.len(),
                    if packages.len() == 1 { "" } else { "s" }
                )
            }
            Self::CreateVenv { recreate: true } => "Recreate virtual environment".to_string(),
            Self::CreateVenv { recreate: false } => "Create virtual environment".to_string(),
            Self::UpgradeBootstrap { .. } => {
                "Upgrade packaging tooling to pinned versions".to_string()
            }
            Self::InstallRequirements { path } => {
                format!("Install requirements from {}", path.display())
            }
            Self::InstallIsolated { package } => {
                format!("Install {} (separate, verbose)", package.pin)
            }
            Self::CleanCaches => "Clean package caches".to_string(),
            Self::WriteStamp { .. } => "Record convergence stamp".to_string(),
        }
    }

    /// Extra lines for `plan --detailed`
    pub fn detail(&self) -> Vec<String> {
        match self {
            Self::InstallOsPackages { packages } => packages.clone(),
            Self::UpgradeBootstrap { pins } => pins.iter().map(ToString::to_string).collect(),
            Self::WriteStamp { digest } => vec![digest.clone()],
            _ => Vec::new(),
        }
    }
}

/// Ordered set of actions needed to converge the host
#[derive(Debug, Clone, Default)]
pub struct Plan {
    pub actions: Vec<Action>,
}

impl Plan {
    /// Empty plan means the host already matches the manifest
    pub fn is_converged(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Compute the actions needed to reach the manifest state
pub fn compute(manifest: &Manifest, observed: &Observed, recreate: bool) -> Result<Plan> {
    let digest = manifest.digest()?;
    let stamp_fresh = observed.venv_exists && observed.stamp.as_deref() == Some(digest.as_str());

    let os_needed = !observed.missing_packages.is_empty();
    let venv_needed = recreate || !observed.venv_exists;
    let pip_needed = venv_needed || !stamp_fresh;

    let mut actions = Vec::new();

    if os_needed {
        // Index refresh only matters when something will be installed
        actions.push(Action::RefreshPackageIndex);
        actions.push(Action::InstallOsPackages {
            packages: observed.missing_packages.clone(),
        });
    }

    if venv_needed {
        actions.push(Action::CreateVenv {
            recreate: recreate && observed.venv_exists,
        });
    }

    if pip_needed {
        if !manifest.bootstrap.is_empty() {
            actions.push(Action::UpgradeBootstrap {
                pins: manifest.bootstrap.clone(),
            });
        }
        if let Some(requirements) = &manifest.requirements {
            actions.push(Action::InstallRequirements {
                path: requirements.clone(),
            });
        }
        for package in &manifest.isolated {
            actions.push(Action::InstallIsolated {
                package: package.clone(),
            });
        }
        actions.push(Action::CleanCaches);
        actions.push(Action::WriteStamp { digest });
    }

    Ok(Plan { actions })
}
