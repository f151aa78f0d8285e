//! Provisioning manifest (provenv.yaml) data structures
//!
//! The manifest is the single declarative source of truth for the target
//! environment: OS packages grouped by purpose, the Python interpreter
//! version, the venv location, and the pinned dependency set. It replaces
//! the per-host shell scripts that used to drift apart.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::pin::Pin;
use crate::error::{ProvenvError, Result};

/// A native-heavy package installed separately with verbose build output
///
/// These are the packages most likely to fail against missing headers or
/// ABI mismatches; installing them one at a time keeps the failing build
/// log attributable to a single package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IsolatedPackage {
    pub pin: Pin,

    /// Module imported to prove the native extension loads
    /// (defaults to the package name with `-` replaced by `_`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import: Option<String>,
}

impl IsolatedPackage {
    #[allow(dead_code)]
    pub fn new(pin: Pin) -> Self {
        Self { pin, import: None }
    }

    pub fn with_import(pin: Pin, import: impl Into<String>) -> Self {
        Self {
            pin,
            import: Some(import.into()),
        }
    }

    pub fn import_name(&self) -> String {
        match &self.import {
            Some(name) => name.clone(),
            None => self.pin.name.replace('-', "_"),
        }
    }
}

/// Provisioning manifest (provenv.yaml)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Environment name, used in reports
    pub name: String,

    /// Python interpreter version as major.minor (e.g. "3.11")
    pub python: String,

    /// Absolute path of the virtual environment
    pub venv: PathBuf,

    /// Extra environment applied to every provisioning subprocess
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,

    /// OS packages grouped by purpose (toolchain, xml, graphics, ...)
    #[serde(default)]
    pub os_packages: BTreeMap<String, Vec<String>>,

    /// Packaging tooling pinned and upgraded before anything else
    #[serde(default)]
    pub bootstrap: Vec<Pin>,

    /// Optional requirements file installed with forced build isolation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<PathBuf>,

    /// Native-heavy packages installed separately with verbose output
    #[serde(default)]
    pub isolated: Vec<IsolatedPackage>,
}

impl Manifest {
    /// Load and validate a manifest from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ProvenvError::ManifestNotFound {
                path: path.display().to_string(),
            });
        }

        let content = fs::read_to_string(path).map_err(|e| ProvenvError::FileReadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let manifest: Self =
            serde_yaml::from_str(&content).map_err(|e| ProvenvError::ManifestParseFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        manifest.validate()?;
        Ok(manifest)
    }

    /// Parse a manifest from a YAML string (does not validate)
    #[allow(dead_code)]
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let manifest: Self = serde_yaml::from_str(yaml)?;
        Ok(manifest)
    }

    /// Serialize the manifest to YAML
    pub fn to_yaml(&self) -> Result<String> {
        let yaml = serde_yaml::to_string(self)?;
        Ok(yaml)
    }

    /// Check manifest invariants
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ProvenvError::ManifestInvalid {
                message: "name must not be empty".to_string(),
            });
        }

        let mut parts = self.python.split('.');
        let valid_python = matches!(
            (parts.next(), parts.next(), parts.next()),
            (Some(major), Some(minor), None)
                if !major.is_empty()
                    && !minor.is_empty()
                    && major.chars().all(|c| c.is_ascii_digit())
                    && minor.chars().all(|c| c.is_ascii_digit())
        );
        if !valid_python {
            return Err(ProvenvError::ManifestInvalid {
                message: format!("python must be major.minor (e.g. \"3.11\"), got \"{}\"", self.python),
            });
        }

        if !self.venv.is_absolute() {
            return Err(ProvenvError::ManifestInvalid {
                message: format!("venv path must be absolute, got {}", self.venv.display()),
            });
        }

        let mut seen = BTreeMap::new();
        for (group, packages) in &self.os_packages {
            for package in packages {
                if package.trim().is_empty() {
                    return Err(ProvenvError::ManifestInvalid {
                        message: format!("empty package name in group '{}'", group),
                    });
                }
                if let Some(previous) = seen.insert(package.clone(), group.clone()) {
                    return Err(ProvenvError::ManifestInvalid {
                        message: format!(
                            "package '{}' listed in both '{}' and '{}'",
                            package, previous, group
                        ),
                    });
                }
            }
        }

        Ok(())
    }

    /// All OS packages across groups, in group order
    pub fn all_os_packages(&self) -> Vec<String> {
        self.os_packages.values().flatten().cloned().collect()
    }

    /// Interpreter binary used to create the venv (e.g. `python3.11`)
    pub fn python_program(&self) -> String {
        format!("python{}", self.python)
    }

    /// Extra subprocess environment as key/value pairs
    pub fn env_pairs(&self) -> Vec<(String, String)> {
        self.environment
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// All pip pins the verifier asserts on (bootstrap + isolated)
    pub fn pinned_packages(&self) -> Vec<Pin> {
        let mut pins = self.bootstrap.clone();
        pins.extend(self.isolated.iter().map(|pkg| pkg.pin.clone()));
        pins
    }

    /// Content digest used as the convergence stamp
    ///
    /// Any manifest edit changes the digest, which invalidates the stamp
    /// written into the venv and forces the pip steps to re-run.
    pub fn digest(&self) -> Result<String> {
        let canonical = serde_yaml::to_string(self)?;
        Ok(blake3::hash(canonical.as_bytes()).to_hex().to_string())
    }

    /// The stock manifest written by `provenv init`
    pub fn default_manifest() -> Self {
        let mut os_packages = BTreeMap::new();
        os_packages.insert(
            "toolchain".to_string(),
            vec![
                "build-essential".to_string(),
                "python3.11".to_string(),
                "python3.11-dev".to_string(),
                "python3.11-venv".to_string(),
                "python3-pip".to_string(),
                "swig".to_string(),
                "pkg-config".to_string(),
                "curl".to_string(),
                "wget".to_string(),
                "git".to_string(),
            ],
        );
        os_packages.insert(
            "xml".to_string(),
            vec![
                "libxml2-dev".to_string(),
                "libxslt1-dev".to_string(),
                "zlib1g-dev".to_string(),
            ],
        );
        os_packages.insert(
            "graphics".to_string(),
            vec![
                "libgl1".to_string(),
                "libglib2.0-0".to_string(),
                "libsm6".to_string(),
                "libxext6".to_string(),
                "libxrender1".to_string(),
                "libgomp1".to_string(),
            ],
        );

        Self {
            name: "app-env".to_string(),
            python: "3.11".to_string(),
            venv: PathBuf::from("/app/venv"),
            environment: BTreeMap::new(),
            os_packages,
            bootstrap: vec![
                Pin::new("pip", "23.3.1"),
                Pin::new("setuptools", "65.5.0"),
                Pin::new("wheel", "0.41.2"),
            ],
            requirements: Some(PathBuf::from("requirements.txt")),
            isolated: vec![
                IsolatedPackage::with_import(Pin::new("lxml", "4.9.4"), "lxml.etree"),
                IsolatedPackage::with_import(Pin::new("faiss-cpu", "1.7.4"), "faiss"),
            ],
        }
    }
}
